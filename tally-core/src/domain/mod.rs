//! Core domain entities
//!
//! Pure data structures and validation rules - no I/O.

mod account;
pub mod balance;
pub mod result;

pub use account::{Account, AccountId};
pub use balance::BalanceChange;
