//! Account service - the façade request handlers call into
//!
//! Turns raw client input into store calls and store answers into outcomes:
//! bad input becomes `Error::Validation`, a missing record becomes
//! `Error::NotFound`, storage failures pass through untouched.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::balance::require_finite;
use crate::domain::result::{Error, Result};
use crate::domain::{Account, AccountId};
use crate::ports::AccountStore;

/// Body of a create request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub name: Option<String>,
    pub initial_balance: Option<f64>,
}

impl CreateAccountRequest {
    pub fn new(name: impl Into<String>, initial_balance: f64) -> Self {
        Self {
            name: Some(name.into()),
            initial_balance: Some(initial_balance),
        }
    }

    pub fn from_json(body: &JsonValue) -> Result<Self> {
        parse_body(body)
    }
}

/// Body of a full update (name + absolute balance)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub balance: Option<f64>,
}

impl UpdateAccountRequest {
    pub fn new(name: impl Into<String>, balance: f64) -> Self {
        Self {
            name: Some(name.into()),
            balance: Some(balance),
        }
    }

    pub fn from_json(body: &JsonValue) -> Result<Self> {
        parse_body(body)
    }
}

/// Body of a relative balance adjustment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBalanceRequest {
    pub amount: Option<f64>,
}

impl UpdateBalanceRequest {
    pub fn new(amount: f64) -> Self {
        Self {
            amount: Some(amount),
        }
    }

    pub fn from_json(body: &JsonValue) -> Result<Self> {
        parse_body(body)
    }
}

/// Wrongly typed JSON fields are client errors, not serialization failures
fn parse_body<T: DeserializeOwned>(body: &JsonValue) -> Result<T> {
    if !body.is_object() {
        return Err(Error::validation("request body must be a JSON object"));
    }
    serde_json::from_value(body.clone()).map_err(|e| Error::validation(e.to_string()))
}

/// Parse an identifier as received from a path segment or CLI argument
///
/// Anything that isn't a positive decimal integer is malformed. An all-digit
/// id too large for `AccountId` is well formed but can't name a record, so
/// it is reported as not found.
pub fn parse_account_id(raw: &str) -> Result<AccountId> {
    let trimmed = raw.trim();
    match trimmed.parse::<AccountId>() {
        Ok(id) if id > 0 => Ok(id),
        Err(_) if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) => {
            Err(Error::not_found(format!("account {}", trimmed)))
        }
        _ => Err(Error::validation(format!("Invalid account ID: {:?}", raw))),
    }
}

fn require_name(name: Option<String>) -> Result<String> {
    match name {
        Some(n) if !n.trim().is_empty() => Ok(n),
        _ => Err(Error::validation("name is required")),
    }
}

fn not_found(id: AccountId) -> Error {
    Error::not_found(format!("account {}", id))
}

/// Account service façade
///
/// Holds nothing but a handle to the injected store.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Backend name of the underlying store
    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        self.store.list_all()
    }

    pub fn get_account(&self, id: &str) -> Result<Account> {
        let id = parse_account_id(id)?;
        self.store.get_by_id(id)?.ok_or_else(|| not_found(id))
    }

    pub fn create_account(&self, request: CreateAccountRequest) -> Result<Account> {
        let name = require_name(request.name)?;
        let initial_balance = require_finite("initialBalance", request.initial_balance)?;
        self.store.insert(&name, initial_balance)
    }

    /// Replace name and balance; the balance is absolute, not a delta
    pub fn update_account(&self, id: &str, request: UpdateAccountRequest) -> Result<Account> {
        let id = parse_account_id(id)?;
        let name = require_name(request.name)?;
        let balance = require_finite("balance", request.balance)?;
        self.store
            .replace(id, &name, balance)?
            .ok_or_else(|| not_found(id))
    }

    /// Add a signed amount to the current balance
    pub fn update_balance(&self, id: &str, request: UpdateBalanceRequest) -> Result<Account> {
        let id = parse_account_id(id)?;
        let delta = require_finite("amount", request.amount)?;
        self.store
            .adjust_balance(id, delta)?
            .ok_or_else(|| not_found(id))
    }

    pub fn delete_account(&self, id: &str) -> Result<()> {
        let id = parse_account_id(id)?;
        if self.store.remove(id)? {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}
