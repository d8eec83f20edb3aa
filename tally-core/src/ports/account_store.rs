//! Account store port - persistence abstraction

use crate::domain::result::Result;
use crate::domain::{Account, AccountId};

/// Owner of the account record set
///
/// Implementations must be safe to share across threads: id allocation is
/// atomic, `adjust_balance` is an atomic read-modify-write per account, and
/// readers never observe a partially written record.
///
/// A missing record is reported as `None`/`false`. `Err` is reserved for the
/// storage medium failing.
pub trait AccountStore: Send + Sync {
    /// Short backend name for diagnostics ("memory", "duckdb")
    fn backend(&self) -> &'static str;

    /// All accounts ordered by ascending id
    fn list_all(&self) -> Result<Vec<Account>>;

    /// Exact-match lookup
    fn get_by_id(&self, id: AccountId) -> Result<Option<Account>>;

    /// Create a record under the next unused id, stamped with the current time
    ///
    /// Performs no validation of its own.
    fn insert(&self, name: &str, initial_balance: f64) -> Result<Account>;

    /// Replace name and balance of an existing record
    fn replace(&self, id: AccountId, name: &str, balance: f64) -> Result<Option<Account>>;

    /// Add `delta` to the stored balance
    fn adjust_balance(&self, id: AccountId, delta: f64) -> Result<Option<Account>>;

    /// Hard-delete a record, returning whether one existed
    fn remove(&self, id: AccountId) -> Result<bool>;
}
