//! Payment-account command implementations

use anyhow::{Context, Result};
use paisa_core::db::Database;

pub fn cmd_accounts_list(db: &Database) -> Result<()> {
    let accounts = db.list_payment_accounts()?;

    if accounts.is_empty() {
        println!("No payment accounts yet. Add one with: paisa accounts add <name>");
        return Ok(());
    }

    println!("{:<6} {:<30}", "ID", "NAME");
    for account in accounts {
        println!("{:<6} {:<30}", account.id, account.name);
    }

    Ok(())
}

pub fn cmd_accounts_add(db: &Database, name: &str) -> Result<()> {
    let id = db
        .add_payment_account(name)
        .context("Failed to add payment account")?;

    println!("✅ Account added: {} (id {})", name, id);
    Ok(())
}

pub fn cmd_accounts_rm(db: &Database, id: i64) -> Result<()> {
    db.delete_payment_account(id)
        .context("Failed to delete payment account")?;

    println!("✅ Account {} removed", id);
    Ok(())
}
