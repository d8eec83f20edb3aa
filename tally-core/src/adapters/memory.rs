//! In-memory account store
//!
//! Records live in an ordered map guarded by a `RwLock`; each record has its
//! own `Mutex`. Balance adjustments only take the map's read lock, so
//! adjustments on different accounts run in parallel while adjustments on the
//! same account serialize on its record lock. Inserts and removals take the
//! write lock.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use crate::domain::result::{Error, Result};
use crate::domain::{Account, AccountId, BalanceChange};
use crate::ports::AccountStore;

fn poisoned<T>(e: PoisonError<T>) -> Error {
    Error::database(format!("Lock poisoned: {}", e))
}

/// Process-local account store
pub struct InMemoryAccountStore {
    records: RwLock<BTreeMap<AccountId, Mutex<Account>>>,
    /// Next id to hand out; only advanced under the map write lock
    next_id: AtomicI64,
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of records currently held
    pub fn len(&self) -> Result<usize> {
        Ok(self.records.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl AccountStore for InMemoryAccountStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn list_all(&self) -> Result<Vec<Account>> {
        let records = self.records.read().map_err(poisoned)?;
        records
            .values()
            .map(|record| record.lock().map(|a| a.clone()).map_err(poisoned))
            .collect()
    }

    fn get_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        let records = self.records.read().map_err(poisoned)?;
        match records.get(&id) {
            Some(record) => Ok(Some(record.lock().map_err(poisoned)?.clone())),
            None => Ok(None),
        }
    }

    fn insert(&self, name: &str, initial_balance: f64) -> Result<Account> {
        let initial_balance = BalanceChange::Set(initial_balance).apply(0.0)?;
        let mut records = self.records.write().map_err(poisoned)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let account = Account::new(id, name, initial_balance);
        records.insert(id, Mutex::new(account.clone()));
        Ok(account)
    }

    fn replace(&self, id: AccountId, name: &str, balance: f64) -> Result<Option<Account>> {
        let records = self.records.read().map_err(poisoned)?;
        let Some(record) = records.get(&id) else {
            return Ok(None);
        };
        let mut account = record.lock().map_err(poisoned)?;
        let balance = BalanceChange::Set(balance).apply(account.balance)?;
        account.name = name.to_string();
        account.balance = balance;
        Ok(Some(account.clone()))
    }

    fn adjust_balance(&self, id: AccountId, delta: f64) -> Result<Option<Account>> {
        let records = self.records.read().map_err(poisoned)?;
        let Some(record) = records.get(&id) else {
            return Ok(None);
        };
        let mut account = record.lock().map_err(poisoned)?;
        account.balance = BalanceChange::Adjust(delta).apply(account.balance)?;
        Ok(Some(account.clone()))
    }

    fn remove(&self, id: AccountId) -> Result<bool> {
        let mut records = self.records.write().map_err(poisoned)?;
        Ok(records.remove(&id).is_some())
    }
}
