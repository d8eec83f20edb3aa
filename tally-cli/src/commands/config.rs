//! Config command - inspect and change persisted settings

use anyhow::Result;
use clap::Subcommand;
use tally_core::config::{Config, StoreBackend, DB_FILE_ENV, STORE_ENV};

use super::get_data_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration (settings plus environment)
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write store settings to settings.json
    Set {
        /// Store backend (memory or duckdb)
        #[arg(long)]
        backend: Option<StoreBackend>,
        /// Database file name inside the data directory
        #[arg(long)]
        database_file: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn config_json(config: &Config, data_dir: &std::path::Path) -> serde_json::Value {
    serde_json::json!({
        "backend": config.backend.to_string(),
        "database_file": config.database_file,
        "database_path": config.database_path(data_dir).to_string_lossy(),
        "secrets_path": config.secrets_path(data_dir).to_string_lossy(),
    })
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;

    match command {
        ConfigCommands::Show { json } => {
            let config = Config::load(&data_dir)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config_json(&config, &data_dir))?);
            } else {
                println!("Backend:   {}", config.backend);
                println!("Database:  {}", config.database_path(&data_dir).display());
                println!("Secrets:   {}", config.secrets_path(&data_dir).display());
            }
        }
        ConfigCommands::Set {
            backend,
            database_file,
            json,
        } => {
            let mut config = Config::load(&data_dir)?;
            if let Some(backend) = backend {
                config.backend = backend;
            }
            if let Some(file) = database_file {
                config.database_file = file;
            }
            config.save(&data_dir)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&config_json(&config, &data_dir))?);
            } else {
                output::success("Settings saved");
                for var in [STORE_ENV, DB_FILE_ENV] {
                    if std::env::var(var).is_ok_and(|v| !v.trim().is_empty()) {
                        output::warning(&format!("{} is set and overrides settings.json", var));
                    }
                }
            }
        }
    }

    Ok(())
}
