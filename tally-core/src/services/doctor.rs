//! Doctor service - storage and configuration health checks

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::domain::result::Result;
use crate::ports::{AccountStore, SecretStore};

/// Doctor service for health checks
pub struct DoctorService {
    store: Arc<dyn AccountStore>,
    secrets: Arc<dyn SecretStore>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn AccountStore>, secrets: Arc<dyn SecretStore>) -> Self {
        Self { store, secrets }
    }

    /// Run all health checks
    ///
    /// A failing check is reported in the result, it never aborts the run.
    pub fn run_checks(&self) -> Result<DoctorResult> {
        let mut checks = BTreeMap::new();

        // Storage reachable + record sanity
        match self.store.list_all() {
            Ok(accounts) => {
                checks.insert(
                    "storage".to_string(),
                    CheckResult::pass(format!(
                        "{} backend reachable ({} account(s))",
                        self.store.backend(),
                        accounts.len()
                    )),
                );

                let out_of_order: Vec<serde_json::Value> = accounts
                    .windows(2)
                    .filter(|pair| pair[0].id >= pair[1].id)
                    .map(|pair| json!({"id": pair[1].id, "previous_id": pair[0].id}))
                    .collect();
                let invalid: Vec<serde_json::Value> = accounts
                    .iter()
                    .filter_map(|a| a.validate().err().map(|e| json!({"id": a.id, "problem": e})))
                    .collect();

                let ids_check = if out_of_order.is_empty() {
                    CheckResult::pass("Account ids are unique and ascending")
                } else {
                    CheckResult::error(
                        format!("{} account id(s) out of order", out_of_order.len()),
                        Some(out_of_order),
                    )
                };
                checks.insert("account_ids".to_string(), ids_check);

                let records_check = if invalid.is_empty() {
                    CheckResult::pass("All account records are valid")
                } else {
                    CheckResult::error(
                        format!("{} account record(s) are invalid", invalid.len()),
                        Some(invalid),
                    )
                };
                checks.insert("account_records".to_string(), records_check);
            }
            Err(e) => {
                let message = format!("{} backend unavailable: {}", self.store.backend(), e);
                checks.insert("storage".to_string(), CheckResult::error(message, None));
            }
        }

        // Secrets are diagnostic-only: missing configuration is a warning
        let secrets_check = if !self.secrets.is_configured() {
            CheckResult::warning("No secret store configured")
        } else {
            match self.secrets.list_secrets() {
                Ok(names) => CheckResult::pass(format!(
                    "Secret store readable ({} secret(s))",
                    names.len()
                )),
                Err(e) => CheckResult::error(format!("Secret store unreadable: {}", e), None),
            }
        };
        checks.insert("secrets".to_string(), secrets_check);

        let passed = checks.values().filter(|c| c.status == "pass").count() as i64;
        let warnings = checks.values().filter(|c| c.status == "warning").count() as i64;
        let errors = checks.values().filter(|c| c.status == "error").count() as i64;

        Ok(DoctorResult {
            checks,
            summary: DoctorSummary {
                passed,
                warnings,
                errors,
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub checks: BTreeMap<String, CheckResult>,
    pub summary: DoctorSummary,
}

impl DoctorResult {
    pub fn is_healthy(&self) -> bool {
        self.summary.errors == 0
    }
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<serde_json::Value>>,
}

impl CheckResult {
    fn new(status: &str, message: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn pass(message: impl Into<String>) -> Self {
        Self::new("pass", message)
    }

    fn warning(message: impl Into<String>) -> Self {
        Self::new("warning", message)
    }

    fn error(message: impl Into<String>, details: Option<Vec<serde_json::Value>>) -> Self {
        Self {
            details,
            ..Self::new("error", message)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub passed: i64,
    pub warnings: i64,
    pub errors: i64,
}
