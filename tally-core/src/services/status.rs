//! Status service - account totals and service info

use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::Result;
use crate::ports::AccountStore;

/// Status service for account summaries
pub struct StatusService {
    store: Arc<dyn AccountStore>,
}

impl StatusService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Get overall status summary
    pub fn get_status(&self) -> Result<StatusSummary> {
        let accounts = self.store.list_all()?;

        Ok(StatusSummary {
            service: "tally".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            backend: self.store.backend().to_string(),
            total_accounts: accounts.len() as i64,
            total_balance: accounts.iter().map(|a| a.balance).sum(),
            negative_accounts: accounts.iter().filter(|a| a.balance < 0.0).count() as i64,
            newest_account_id: accounts.last().map(|a| a.id),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub service: String,
    pub version: String,
    pub backend: String,
    pub total_accounts: i64,
    pub total_balance: f64,
    pub negative_accounts: i64,
    pub newest_account_id: Option<i64>,
}
