//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - In-process maps and DuckDB for the AccountStore port
//! - A JSON file (with env overrides) for the SecretStore port

pub mod duckdb;
pub mod memory;
pub mod secrets;
