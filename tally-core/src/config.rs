//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "store": { "backend": "duckdb", "databaseFile": "tally.duckdb" },
//!   "secrets": { "file": "secrets.json" }
//! }
//! ```
//! Keys this crate doesn't manage are preserved when saving.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Environment override for the store backend
pub const STORE_ENV: &str = "TALLY_STORE";

/// Environment override for the database file name
pub const DB_FILE_ENV: &str = "TALLY_DB_FILE";

const DEFAULT_DB_FILE: &str = "tally.duckdb";
const DEFAULT_SECRETS_FILE: &str = "secrets.json";

/// Which AccountStore implementation to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local, nothing survives exit
    Memory,
    #[default]
    Duckdb,
}

impl FromStr for StoreBackend {
    type Err = crate::domain::result::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" | "in-memory" => Ok(Self::Memory),
            "duckdb" | "persistent" | "db" => Ok(Self::Duckdb),
            other => Err(crate::domain::result::Error::Config(format!(
                "unknown store backend '{}' (expected 'memory' or 'duckdb')",
                other
            ))),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Duckdb => write!(f, "duckdb"),
        }
    }
}

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    store: StoreSettings,
    #[serde(default)]
    secrets: SecretsSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreSettings {
    #[serde(default)]
    backend: Option<StoreBackend>,
    #[serde(default)]
    database_file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretsSettings {
    #[serde(default)]
    file: Option<String>,
}

/// Tally configuration (resolved view of settings + environment)
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: StoreBackend,
    pub database_file: String,
    pub secrets_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            database_file: DEFAULT_DB_FILE.to_string(),
            secrets_file: DEFAULT_SECRETS_FILE.to_string(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// Precedence: environment (`TALLY_STORE`, `TALLY_DB_FILE`), then
    /// settings.json, then defaults. A malformed settings file is an error
    /// rather than being silently replaced by defaults.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(data_dir)?;

        let backend = match std::env::var(STORE_ENV) {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => raw.store.backend.unwrap_or_default(),
        };

        let database_file = match std::env::var(DB_FILE_ENV) {
            Ok(value) if !value.trim().is_empty() => value,
            _ => raw
                .store
                .database_file
                .unwrap_or_else(|| DEFAULT_DB_FILE.to_string()),
        };

        Ok(Self {
            backend,
            database_file,
            secrets_file: raw
                .secrets
                .file
                .unwrap_or_else(|| DEFAULT_SECRETS_FILE.to_string()),
        })
    }

    /// Save config to the data directory, preserving unmanaged keys
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let mut settings = read_settings(data_dir)?;

        settings.store.backend = Some(self.backend);
        settings.store.database_file = Some(self.database_file.clone());
        settings.secrets.file = Some(self.secrets_file.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(settings_path(data_dir), content)?;
        Ok(())
    }

    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.database_file)
    }

    pub fn secrets_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.secrets_file)
    }
}

fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("settings.json")
}

fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let path = settings_path(data_dir);
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_settings_file() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();

        assert_eq!(config.database_file, "tally.duckdb");
        assert_eq!(config.secrets_path(dir.path()), dir.path().join("secrets.json"));
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"ui": {"theme": "dark"}, "store": {"backend": "memory"}}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.database_file = "other.duckdb".to_string();
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["ui"]["theme"], "dark");
        assert_eq!(value["store"]["databaseFile"], "other.duckdb");
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!(" DuckDB ".parse::<StoreBackend>().unwrap(), StoreBackend::Duckdb);
        assert!("sqlite".parse::<StoreBackend>().is_err());
        assert_eq!(StoreBackend::Memory.to_string(), "memory");
    }

    #[test]
    fn test_malformed_settings_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{not json").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }
}
