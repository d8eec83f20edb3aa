//! Tally Core - account persistence and balance-update service
//!
//! Hexagonal layout:
//!
//! - **domain**: the Account entity, balance policy, error types
//! - **ports**: traits for the account store and the secrets lookup
//! - **services**: the account façade plus status/doctor/logging
//! - **adapters**: in-memory and DuckDB stores, file-backed secrets

pub mod adapters;
pub mod config;
pub mod domain;
mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::duckdb::DuckDbAccountStore;
use adapters::memory::InMemoryAccountStore;
use adapters::secrets::FileSecretStore;
use config::{Config, StoreBackend};
use ports::{AccountStore, SecretStore};
use services::{AccountService, DoctorService, StatusService};

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{Account, AccountId};
pub use services::{EntryPoint, LogEvent, LoggingService};

/// Build the account store the configuration asks for
pub fn open_store(config: &Config, data_dir: &Path) -> Result<Arc<dyn AccountStore>> {
    let store: Arc<dyn AccountStore> = match config.backend {
        StoreBackend::Memory => Arc::new(InMemoryAccountStore::new()),
        StoreBackend::Duckdb => {
            let db_path = config.database_path(data_dir);
            Arc::new(
                DuckDbAccountStore::new(&db_path)
                    .with_context(|| format!("Failed to open database {:?}", db_path))?,
            )
        }
    };
    Ok(store)
}

/// Main context for Tally operations
///
/// Constructed once per process. Owns the single store instance every
/// service shares.
pub struct TallyContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub store: Arc<dyn AccountStore>,
    pub secrets: Arc<dyn SecretStore>,
    pub account_service: AccountService,
    pub status_service: StatusService,
    pub doctor_service: DoctorService,
}

impl TallyContext {
    /// Load configuration from `data_dir` and open the configured store
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let store = open_store(&config, data_dir)?;
        let secrets: Arc<dyn SecretStore> =
            Arc::new(FileSecretStore::new(config.secrets_path(data_dir)));
        Ok(Self::with_parts(config, data_dir, store, secrets))
    }

    /// Assemble a context around an already constructed store
    pub fn with_parts(
        config: Config,
        data_dir: &Path,
        store: Arc<dyn AccountStore>,
        secrets: Arc<dyn SecretStore>,
    ) -> Self {
        Self {
            account_service: AccountService::new(Arc::clone(&store)),
            status_service: StatusService::new(Arc::clone(&store)),
            doctor_service: DoctorService::new(Arc::clone(&store), Arc::clone(&secrets)),
            config,
            data_dir: data_dir.to_path_buf(),
            store,
            secrets,
        }
    }
}
