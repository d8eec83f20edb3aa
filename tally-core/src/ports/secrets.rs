//! Secrets port - opaque key-value lookup

use crate::domain::result::Result;

/// Named secret lookup used for diagnostics and bootstrap
///
/// An unconfigured store answers "absent" rather than failing.
pub trait SecretStore: Send + Sync {
    /// Whether the store has a backing location to read from
    fn is_configured(&self) -> bool;

    /// Look up a secret by name
    fn get_secret(&self, name: &str) -> Result<Option<String>>;

    /// Create or overwrite a secret
    fn set_secret(&self, name: &str, value: &str) -> Result<()>;

    /// Names of all known secrets, sorted
    fn list_secrets(&self) -> Result<Vec<String>>;
}
