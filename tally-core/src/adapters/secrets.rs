//! File-backed secret store
//!
//! Secrets live in a flat JSON object (`secrets.json` in the data directory).
//! An environment variable `<PREFIX><NAME>` overrides the file, with the name
//! upper-cased and `-`/`.` mapped to `_`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::result::{Error, Result};
use crate::ports::SecretStore;

/// Default environment override prefix
pub const DEFAULT_ENV_PREFIX: &str = "TALLY_SECRET_";

pub struct FileSecretStore {
    path: Option<PathBuf>,
    env_prefix: String,
    /// Serializes read-modify-write of the file within this process
    write_lock: Mutex<()>,
}

impl FileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store with no backing file; only environment overrides resolve
    pub fn unconfigured() -> Self {
        Self {
            path: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn env_key(&self, name: &str) -> String {
        let normalized: String = name
            .chars()
            .map(|c| match c {
                '-' | '.' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();
        format!("{}{}", self.env_prefix, normalized)
    }

    fn read_file(&self) -> Result<BTreeMap<String, String>> {
        match &self.path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)?;
                if content.trim().is_empty() {
                    return Ok(BTreeMap::new());
                }
                Ok(serde_json::from_str(&content)?)
            }
            _ => Ok(BTreeMap::new()),
        }
    }
}

impl SecretStore for FileSecretStore {
    fn is_configured(&self) -> bool {
        self.path.is_some()
    }

    fn get_secret(&self, name: &str) -> Result<Option<String>> {
        if let Ok(value) = std::env::var(self.env_key(name)) {
            return Ok(Some(value));
        }
        Ok(self.read_file()?.remove(name))
    }

    fn set_secret(&self, name: &str, value: &str) -> Result<()> {
        let Some(path) = &self.path else {
            return Err(Error::Config("secret store has no backing file".to_string()));
        };
        if name.trim().is_empty() {
            return Err(Error::validation("secret name cannot be empty"));
        }

        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| Error::Other(format!("Lock poisoned: {}", e)))?;
        let mut secrets = self.read_file()?;
        secrets.insert(name.to_string(), value.to_string());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&secrets)?)?;
        Ok(())
    }

    fn list_secrets(&self) -> Result<Vec<String>> {
        Ok(self.read_file()?.into_keys().collect())
    }
}
