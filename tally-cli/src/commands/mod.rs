//! CLI command implementations

pub mod account;
pub mod config;
pub mod doctor;
pub mod logs;
pub mod secret;
pub mod status;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tally_core::{EntryPoint, LogEvent, LoggingService, OperationResult, TallyContext};

/// Environment variable pointing at the data directory
pub const DATA_DIR_ENV: &str = "TALLY_DIR";

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the tally directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".tally"))
        .ok_or_else(|| anyhow!("Could not find home directory; set {}", DATA_DIR_ENV))
}

/// Get or create tally context
pub fn get_context() -> Result<TallyContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create tally directory: {:?}", data_dir))?;

    TallyContext::new(&data_dir).context("Failed to initialize tally context")
}

/// Report the outcome of a façade call
///
/// With `json` the envelope built by `envelope` goes to stdout; otherwise
/// `render` prints the success case. Failures always come back as `Err` so
/// the process exits non-zero.
pub fn emit<T: Serialize>(
    result: tally_core::domain::result::Result<T>,
    json: bool,
    envelope: impl FnOnce(T) -> OperationResult<T>,
    render: impl FnOnce(&T),
) -> Result<()> {
    match result {
        Ok(data) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&envelope(data))?);
            } else {
                render(&data);
            }
            Ok(())
        }
        Err(e) => {
            if json {
                let failed = OperationResult::<T>::fail(e.to_string());
                println!("{}", serde_json::to_string_pretty(&failed)?);
            }
            Err(e.into())
        }
    }
}
