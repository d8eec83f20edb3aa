//! Account commands - list, inspect and modify accounts

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use tally_core::domain::balance::parse_amount;
use tally_core::services::{CreateAccountRequest, UpdateAccountRequest, UpdateBalanceRequest};
use tally_core::{Account, LogEvent, OperationResult};

use super::{emit, get_context, get_logger, log_event};
use crate::output;

#[derive(Subcommand)]
pub enum AccountCommands {
    /// List all accounts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single account
    Get {
        /// Account ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new account
    Create {
        /// Account name
        name: String,
        /// Opening balance
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        initial_balance: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace an account's name and balance
    Update {
        /// Account ID
        id: String,
        /// New name
        #[arg(long)]
        name: String,
        /// New absolute balance
        #[arg(long, allow_hyphen_values = true)]
        balance: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a signed amount to an account's balance
    Adjust {
        /// Account ID
        id: String,
        /// Amount to add (negative to withdraw)
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an account
    Delete {
        /// Account ID
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn print_account(account: &Account) {
    let mut table = output::create_table();
    table.add_row(vec!["ID".to_string(), account.id.to_string()]);
    table.add_row(vec!["Name".to_string(), account.name.clone()]);
    table.add_row(vec!["Balance".to_string(), output::format_balance(account.balance)]);
    table.add_row(vec![
        "Created".to_string(),
        account.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    ]);
    println!("{}", table);
}

/// JSON envelope for a mutation, carrying a confirmation message
fn with_message(message: &'static str) -> impl FnOnce(Account) -> OperationResult<Account> {
    move |account| OperationResult::ok_with_message(account, message)
}

pub fn run(command: AccountCommands) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();
    let accounts = &ctx.account_service;

    let (operation, result) = match command {
        AccountCommands::List { json } => {
            let result = emit(accounts.list_accounts(), json, OperationResult::list, |list| {
                if list.is_empty() {
                    println!("No accounts found.");
                    return;
                }
                let mut table = output::create_table();
                table.set_header(vec!["ID", "Name", "Balance", "Created"]);
                for account in list {
                    table.add_row(vec![
                        account.id.to_string(),
                        account.name.clone(),
                        output::format_balance(account.balance),
                        account.created_at.format("%Y-%m-%d").to_string(),
                    ]);
                }
                println!("{}", table);
                println!("{}", format!("{} account(s)", list.len()).dimmed());
            });
            ("list_accounts", result)
        }
        AccountCommands::Get { id, json } => {
            let result = emit(accounts.get_account(&id), json, OperationResult::ok, print_account);
            ("get_account", result)
        }
        AccountCommands::Create {
            name,
            initial_balance,
            json,
        } => {
            let outcome = parse_amount("initialBalance", Some(&initial_balance))
                .map(|balance| CreateAccountRequest::new(name, balance))
                .and_then(|request| accounts.create_account(request));
            let result = emit(
                outcome,
                json,
                with_message("Account created successfully"),
                |account| {
                    output::success(&format!("Created account {}", account.id));
                    print_account(account);
                },
            );
            ("create_account", result)
        }
        AccountCommands::Update {
            id,
            name,
            balance,
            json,
        } => {
            let outcome = parse_amount("balance", Some(&balance))
                .map(|balance| UpdateAccountRequest::new(name, balance))
                .and_then(|request| accounts.update_account(&id, request));
            let result = emit(
                outcome,
                json,
                with_message("Account updated successfully"),
                |account| {
                    output::success(&format!("Updated account {}", account.id));
                    print_account(account);
                },
            );
            ("update_account", result)
        }
        AccountCommands::Adjust { id, amount, json } => {
            let outcome = parse_amount("amount", Some(&amount))
                .and_then(|delta| accounts.update_balance(&id, UpdateBalanceRequest::new(delta)));
            let result = emit(
                outcome,
                json,
                with_message("Balance updated successfully"),
                |account| {
                    output::success(&format!(
                        "Account {} balance is now {}",
                        account.id,
                        output::format_balance(account.balance)
                    ));
                },
            );
            ("update_balance", result)
        }
        AccountCommands::Delete { id, force, json } => {
            if !force
                && !json
                && !Confirm::new()
                    .with_prompt(format!("Delete account {}?", id))
                    .default(false)
                    .interact()?
            {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            let message = format!("Account {} deleted", id.trim());
            let result = emit(
                accounts.delete_account(&id),
                json,
                |_| OperationResult::done(message.clone()),
                |_| output::success(&message),
            );
            ("delete_account", result)
        }
    };

    let event = match &result {
        Ok(()) => LogEvent::new("operation_succeeded"),
        Err(e) => LogEvent::new("operation_failed").with_error(e.to_string()),
    };
    log_event(&logger, event.with_operation(operation).with_backend(accounts.backend()));

    result
}
