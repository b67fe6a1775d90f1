//! Merchant-rule command implementations

use anyhow::{Context, Result};
use paisa_core::{db::Database, merchant::normalize_key};

pub fn cmd_rules_list(db: &Database) -> Result<()> {
    let rules = db.list_merchant_rules()?;

    if rules.is_empty() {
        println!("No merchant rules yet. Add one with: paisa rules set <merchant> <category>");
        return Ok(());
    }

    println!("{:<30} {:<20}", "MERCHANT", "CATEGORY");
    for rule in rules {
        println!("{:<30} {:<20}", rule.merchant_key, rule.category);
    }

    Ok(())
}

pub fn cmd_rules_set(db: &Database, merchant: &str, category: &str) -> Result<()> {
    db.upsert_merchant_rule(merchant, category)
        .context("Failed to save merchant rule")?;

    println!(
        "✅ Rule saved: {} → {}",
        normalize_key(merchant),
        category
    );
    println!("   New extractions for this merchant use the category automatically.");
    Ok(())
}

pub fn cmd_rules_rm(db: &Database, merchant: &str) -> Result<()> {
    db.delete_merchant_rule(merchant)
        .context("Failed to delete merchant rule")?;

    println!("✅ Rule removed for {}", normalize_key(merchant));
    Ok(())
}

pub fn cmd_rules_test(db: &Database, merchant: &str) -> Result<()> {
    let key = normalize_key(merchant);
    println!("Normalized key: {}", key);

    match db.lookup_merchant_rule(&key)? {
        Some(category) => println!("Resolves to: {} (learned rule)", category),
        None => println!("Resolves to: Other (no rule; new transactions would need review)"),
    }

    Ok(())
}
