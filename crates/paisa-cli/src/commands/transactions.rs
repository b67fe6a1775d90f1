//! Transaction listing command implementations

use anyhow::Result;
use chrono::DateTime;
use paisa_core::db::Database;
use paisa_core::models::{Direction, Transaction};

use super::truncate;

pub fn cmd_transactions_list(db: &Database, limit: i64) -> Result<()> {
    let transactions = db.list_transactions(limit, 0)?;

    if transactions.is_empty() {
        println!("No transactions yet. Run: paisa ingest --file <feed>");
        return Ok(());
    }

    print_table(&transactions);
    Ok(())
}

pub fn cmd_transactions_review(db: &Database, limit: i64) -> Result<()> {
    let transactions: Vec<Transaction> = db
        .list_transactions(limit * 10, 0)?
        .into_iter()
        .filter(|t| t.needs_review)
        .take(limit as usize)
        .collect();

    if transactions.is_empty() {
        println!("Nothing needs review. 🎉");
        return Ok(());
    }

    print_table(&transactions);
    println!();
    println!("Confirm a category with: paisa rules set <merchant> <category>");
    Ok(())
}

fn print_table(transactions: &[Transaction]) {
    println!(
        "{:<6} {:<11} {:>12} {:<24} {:<16} {:<12} {}",
        "ID", "DATE", "AMOUNT", "MERCHANT", "CATEGORY", "CHANNEL", "ACCOUNT"
    );
    for tx in transactions {
        let date = DateTime::from_timestamp_millis(tx.occurred_at)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let sign = match tx.direction {
            Direction::Debit => "-",
            Direction::Credit => "+",
        };
        // Trailing ? marks a defaulted category awaiting user confirmation
        let amount = format!(
            "{}{:.2}{}",
            sign,
            tx.amount,
            if tx.needs_review { " ?" } else { "" }
        );
        println!(
            "{:<6} {:<11} {:>12} {:<24} {:<16} {:<12} {}",
            tx.id,
            date,
            amount,
            truncate(&tx.merchant_key, 24),
            truncate(&tx.category, 16),
            tx.channel.label(),
            tx.account,
        );
    }
}
