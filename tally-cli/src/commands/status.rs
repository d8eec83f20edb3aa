//! Status command - show account totals and service info

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", format!("{} {}", status.service, status.version).bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Backend".to_string(), status.backend.clone()]);
    table.add_row(vec!["Accounts".to_string(), status.total_accounts.to_string()]);
    table.add_row(vec!["Total balance".to_string(), output::format_balance(status.total_balance)]);
    table.add_row(vec![
        "Overdrawn accounts".to_string(),
        status.negative_accounts.to_string(),
    ]);
    if let Some(id) = status.newest_account_id {
        table.add_row(vec!["Newest account".to_string(), id.to_string()]);
    }
    if status.backend == "duckdb" {
        let db_path = ctx.config.database_path(&ctx.data_dir);
        let size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);
        table.add_row(vec!["Database".to_string(), db_path.display().to_string()]);
        table.add_row(vec!["Database size".to_string(), output::format_size(size)]);
    }
    println!("{}", table);

    if status.backend == "memory" {
        println!();
        output::warning("In-memory backend: accounts are discarded when the process exits.");
    }

    Ok(())
}
