//! Account domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned account identifier (positive, never reused)
pub type AccountId = i64;

/// A named entity holding a balance
///
/// `created_at` is set once when the store creates the record and is never
/// touched by updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub balance: f64,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create an account record stamped with the current time
    pub fn new(id: AccountId, name: impl Into<String>, balance: f64) -> Self {
        Self {
            id,
            name: name.into(),
            balance,
            created_at: Utc::now(),
        }
    }

    /// Validate account data
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.id <= 0 {
            return Err("account id must be positive");
        }
        if self.name.trim().is_empty() {
            return Err("account name cannot be empty");
        }
        if !self.balance.is_finite() {
            return Err("balance must be a finite number");
        }
        Ok(())
    }
}
