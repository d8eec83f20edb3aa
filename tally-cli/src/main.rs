//! Tally CLI - account balances from the terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{account, config, doctor, logs, secret, status};

/// Tally - account persistence and balance updates
#[derive(Parser)]
#[command(name = "tally", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, inspect and modify accounts
    Account {
        #[command(subcommand)]
        command: account::AccountCommands,
    },

    /// Show account totals and service info
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect and change persisted settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// Run storage health checks
    Doctor {
        /// Show verbose output
        #[arg(long, short)]
        verbose: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage operation logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },

    /// Manage stored secrets
    Secret {
        #[command(subcommand)]
        command: secret::SecretCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Account { command } => account::run(command),
        Commands::Status { json } => status::run(json),
        Commands::Config { command } => config::run(command),
        Commands::Doctor { verbose, json } => doctor::run(verbose, json),
        Commands::Logs { command } => logs::run(command),
        Commands::Secret { command } => secret::run(command),
    }
}
