//! Secret commands - manage entries in the secret store
//!
//! Values are never printed by `list`; `get` prints a single value on request.

use anyhow::{bail, Result};
use clap::Subcommand;
use dialoguer::Password;

use super::get_context;
use crate::output;

#[derive(Subcommand)]
pub enum SecretCommands {
    /// Print a secret's value
    Get {
        /// Secret name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Store a secret (prompts when no value is given)
    Set {
        /// Secret name
        name: String,
        /// Secret value
        value: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List stored secret names
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: SecretCommands) -> Result<()> {
    let ctx = get_context()?;

    match command {
        SecretCommands::Get { name, json } => {
            let value = ctx.secrets.get_secret(&name)?;
            if json {
                println!("{}", serde_json::json!({ "name": name, "value": value }));
            } else if let Some(v) = &value {
                println!("{}", v);
            }
            if value.is_none() {
                bail!("Secret '{}' is not set", name);
            }
        }
        SecretCommands::Set { name, value, json } => {
            let value = match value {
                Some(v) => v,
                None => Password::new()
                    .with_prompt(format!("Value for '{}'", name))
                    .interact()?,
            };
            ctx.secrets.set_secret(&name, &value)?;
            if json {
                println!("{}", serde_json::json!({ "name": name, "saved": true }));
            } else {
                output::success(&format!("Secret '{}' saved", name));
            }
        }
        SecretCommands::List { json } => {
            let names = ctx.secrets.list_secrets()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else if names.is_empty() {
                output::info("No secrets stored.");
            } else {
                for name in names {
                    println!("  {}", name);
                }
            }
        }
    }

    Ok(())
}
