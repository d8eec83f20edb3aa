//! DuckDB account store

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use duckdb::{params, Connection, OptionalExt};

use crate::domain::result::{Error, Result};
use crate::domain::{Account, AccountId, BalanceChange};
use crate::ports::AccountStore;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

const SELECT_ACCOUNT: &str = "SELECT id, name, balance, created_at FROM accounts";

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("could not set lock on file")
}

/// Columns as read from the `accounts` table
type AccountRow = (AccountId, String, f64, String);

fn read_row(row: &duckdb::Row) -> duckdb::Result<AccountRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn into_account((id, name, balance, created_at): AccountRow) -> Result<Account> {
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::database(format!("account {} has invalid created_at: {}", id, e)))?;
    Ok(Account {
        id,
        name,
        balance,
        created_at,
    })
}

/// Persistent account store backed by a single DuckDB file
///
/// All statements go through one connection guarded by a mutex, so every
/// operation (including the check + update + re-read sequences) is atomic
/// with respect to other callers in this process. DuckDB itself refuses a
/// second read-write process on the same file.
///
/// The connection mutex is shared by all accounts: adjustments on different
/// accounts never interleave but do wait on each other for the length of one
/// operation. Per-account parallelism is only available from
/// `InMemoryAccountStore`.
pub struct DuckDbAccountStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbAccountStore {
    /// Open (or create) the database file and bring its schema up to date
    ///
    /// Retries with exponential backoff while the file is locked by another
    /// process.
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    let store = Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    };
                    store.ensure_schema()?;
                    return Ok(store);
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[tally] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
    }

    /// Open a throwaway in-memory database with the full schema
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            db_path: None,
        };
        store.ensure_schema()?;
        Ok(store)
    }

    fn try_open_connection(db_path: &Path) -> anyhow::Result<Connection> {
        // Extension autoloading stays off; the schema only needs core types
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> anyhow::Result<MigrationResult> {
        let conn = self.conn()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> anyhow::Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    /// Path of the backing file, `None` for in-memory databases
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    fn select_one(conn: &Connection, id: AccountId) -> Result<Option<Account>> {
        let row = conn
            .query_row(&format!("{} WHERE id = ?", SELECT_ACCOUNT), params![id], read_row)
            .optional()?;
        row.map(into_account).transpose()
    }
}

impl AccountStore for DuckDbAccountStore {
    fn backend(&self) -> &'static str {
        "duckdb"
    }

    fn list_all(&self) -> Result<Vec<Account>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_ACCOUNT))?;
        let rows = stmt.query_map([], read_row)?;

        let mut accounts = Vec::new();
        for row in rows {
            accounts.push(into_account(row?)?);
        }
        Ok(accounts)
    }

    fn get_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        let conn = self.conn()?;
        Self::select_one(&conn, id)
    }

    fn insert(&self, name: &str, initial_balance: f64) -> Result<Account> {
        let initial_balance = BalanceChange::Set(initial_balance).apply(0.0)?;
        let conn = self.conn()?;

        // Sequence values are never handed out twice, even after deletes or
        // rolled-back inserts
        let id: AccountId =
            conn.query_row("SELECT nextval('seq_account_id')", [], |row| row.get(0))?;
        let account = Account::new(id, name, initial_balance);

        conn.execute(
            "INSERT INTO accounts (id, name, balance, created_at) VALUES (?, ?, ?, ?)",
            params![
                account.id,
                &account.name,
                account.balance,
                account.created_at.to_rfc3339()
            ],
        )?;

        Ok(account)
    }

    fn replace(&self, id: AccountId, name: &str, balance: f64) -> Result<Option<Account>> {
        let balance = BalanceChange::Set(balance).apply(0.0)?;
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE accounts SET name = ?, balance = ? WHERE id = ?",
            params![name, balance, id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::select_one(&conn, id)
    }

    fn adjust_balance(&self, id: AccountId, delta: f64) -> Result<Option<Account>> {
        let conn = self.conn()?;
        let Some(current) = Self::select_one(&conn, id)? else {
            return Ok(None);
        };
        // Reject an overflowing result before writing; the connection lock
        // keeps the row unchanged until the update below
        BalanceChange::Adjust(delta).apply(current.balance)?;

        conn.execute(
            "UPDATE accounts SET balance = balance + ? WHERE id = ?",
            params![delta, id],
        )?;
        Self::select_one(&conn, id)
    }

    fn remove(&self, id: AccountId) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM accounts WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}
