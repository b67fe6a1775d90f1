//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, status, reset) and shared utilities (open_db)
//! - `ingest` - Feed ingest command
//! - `rules` - Merchant-rule management commands
//! - `accounts` - Payment-account management commands
//! - `transactions` - Transaction listing commands

pub mod accounts;
pub mod core;
pub mod ingest;
pub mod rules;
pub mod transactions;

// Re-export command functions for main.rs
pub use accounts::*;
pub use core::*;
pub use ingest::*;
pub use rules::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "…" if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
