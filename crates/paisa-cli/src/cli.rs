//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Paisa - Turn bank/UPI SMS into a ledger
#[derive(Parser)]
#[command(name = "paisa")]
#[command(about = "Self-hosted SMS expense tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set PAISA_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Ingest raw SMS messages from a feed file
    Ingest {
        /// Feed file to ingest (JSON array or CSV with sender,body,timestamp)
        #[arg(short, long)]
        file: PathBuf,

        /// Feed format: json, csv (auto-detected if not specified)
        #[arg(long)]
        format: Option<String>,
    },

    /// Show database status (encryption, counts)
    Status,

    /// Manage transactions
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Manage learned merchant→category rules
    Rules {
        #[command(subcommand)]
        action: Option<RulesAction>,
    },

    /// Manage payment accounts
    Accounts {
        #[command(subcommand)]
        action: Option<AccountsAction>,
    },

    /// Clear extracted transactions (keeps rules and accounts)
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List recent transactions
    List {
        /// Maximum number to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },
    /// List transactions whose category still needs confirmation
    Review {
        /// Maximum number to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum RulesAction {
    /// Set (create or update) the category for a merchant
    Set {
        /// Merchant name (normalized automatically)
        merchant: String,
        /// Category to assign
        category: String,
    },
    /// Delete the rule for a merchant
    Rm {
        /// Merchant name (normalized automatically)
        merchant: String,
    },
    /// Show what category a merchant resolves to right now
    Test {
        /// Merchant name to test
        merchant: String,
    },
}

#[derive(Subcommand)]
pub enum AccountsAction {
    /// Add a payment account
    Add {
        /// Account name (e.g. "SBI Bank", "HDFC Savings")
        name: String,
    },
    /// Remove a payment account
    Rm {
        /// Account ID
        id: i64,
    },
}
