//! Paisa CLI - SMS expense tracker
//!
//! Usage:
//!   paisa init                  Initialize database
//!   paisa ingest --file FEED    Ingest raw SMS messages (auto-detects format)
//!   paisa rules set M CAT       Teach the pipeline a merchant's category
//!   paisa status                Show database status

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let db_path = commands::resolve_db_path(cli.db.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path, cli.no_encrypt),
        Commands::Ingest { file, format } => {
            commands::cmd_ingest(&db_path, &file, format.as_deref(), cli.no_encrypt)
        }
        Commands::Status => commands::cmd_status(&db_path, cli.no_encrypt),
        Commands::Transactions { action } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            match action {
                None => commands::cmd_transactions_list(&db, 20),
                Some(TransactionsAction::List { limit }) => {
                    commands::cmd_transactions_list(&db, limit)
                }
                Some(TransactionsAction::Review { limit }) => {
                    commands::cmd_transactions_review(&db, limit)
                }
            }
        }
        Commands::Rules { action } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            match action {
                None => commands::cmd_rules_list(&db),
                Some(RulesAction::Set { merchant, category }) => {
                    commands::cmd_rules_set(&db, &merchant, &category)
                }
                Some(RulesAction::Rm { merchant }) => commands::cmd_rules_rm(&db, &merchant),
                Some(RulesAction::Test { merchant }) => commands::cmd_rules_test(&db, &merchant),
            }
        }
        Commands::Accounts { action } => {
            let db = commands::open_db(&db_path, cli.no_encrypt)?;
            match action {
                None => commands::cmd_accounts_list(&db),
                Some(AccountsAction::Add { name }) => commands::cmd_accounts_add(&db, &name),
                Some(AccountsAction::Rm { id }) => commands::cmd_accounts_rm(&db, id),
            }
        }
        Commands::Reset { yes } => commands::cmd_reset(&db_path, yes, cli.no_encrypt),
    }
}
