//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `resolve_db_path` / `open_db` - Shared database helpers
//! - `cmd_init` - Initialize the database
//! - `cmd_status` - Show database status
//! - `cmd_reset` - Clear extracted transactions

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use paisa_core::db::Database;

/// Resolve the database path: explicit flag, or the platform data directory
pub fn resolve_db_path(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }

    let data_dir = dirs::data_local_dir()
        .map(|d| d.join("paisa"))
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    Ok(data_dir.join("paisa.db"))
}

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path.to_str().context("Database path is not valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let _db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Ingest messages: paisa ingest --file sms-backup.json");
    println!("  2. Confirm categories: paisa rules set ZOMATO Dining");

    Ok(())
}

pub fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;

    println!("📊 Paisa Status");
    println!("   ─────────────────────────────");
    println!("   Database: {}", db.path());
    println!(
        "   Encryption: {}",
        if db.is_encrypted()? { "enabled" } else { "disabled" }
    );
    println!("   Transactions: {}", db.count_transactions()?);
    println!("   Needing review: {}", db.count_needs_review()?);
    println!("   Merchant rules: {}", db.count_merchant_rules()?);
    println!("   Payment accounts: {}", db.list_payment_accounts()?.len());

    Ok(())
}

pub fn cmd_reset(db_path: &Path, yes: bool, no_encrypt: bool) -> Result<()> {
    if !yes {
        println!("⚠️  This clears all extracted transactions (rules and accounts are kept).");
        println!("   Re-run with --yes to confirm.");
        return Ok(());
    }

    let db = open_db(db_path, no_encrypt)?;
    db.soft_reset().context("Failed to reset database")?;

    println!("✅ Transactions cleared. Rules and accounts preserved.");
    Ok(())
}
