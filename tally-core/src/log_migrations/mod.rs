//! Log database migrations - embedded SQL files
//!
//! Same layout as the account migrations, applied to `logs.duckdb`.

/// All log migrations, embedded at compile time.
/// Format: (filename, sql_content)
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_logs.sql", include_str!("001_logs.sql")),
];
