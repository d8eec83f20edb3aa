//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod account_store;
mod secrets;

pub use account_store::AccountStore;
pub use secrets::SecretStore;
