//! Learned merchant→category rule operations
//!
//! Rules are created or edited only by explicit user action; the pipeline
//! consults them read-only. Keys are normalized with
//! [`crate::merchant::normalize_key`] on every write so read-time lookups
//! cannot silently miss.

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::merchant::normalize_key;
use crate::models::MerchantRule;

impl Database {
    /// Look up the learned category for a merchant key
    pub fn lookup_merchant_rule(&self, merchant_key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let category: Option<String> = conn
            .query_row(
                "SELECT category FROM merchant_rules WHERE merchant_key = ?",
                params![normalize_key(merchant_key)],
                |row| row.get(0),
            )
            .optional()?;
        Ok(category)
    }

    /// Create or update a merchant rule
    pub fn upsert_merchant_rule(&self, merchant: &str, category: &str) -> Result<()> {
        let key = normalize_key(merchant);
        if key.is_empty() {
            return Err(Error::InvalidData(format!(
                "Merchant name normalizes to nothing: {}",
                merchant
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO merchant_rules (merchant_key, category) VALUES (?, ?)
             ON CONFLICT(merchant_key) DO UPDATE SET category = excluded.category",
            params![key, category],
        )?;
        Ok(())
    }

    /// Delete a merchant rule; errors if no rule exists for the key
    pub fn delete_merchant_rule(&self, merchant: &str) -> Result<()> {
        let key = normalize_key(merchant);
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM merchant_rules WHERE merchant_key = ?",
            params![key],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("No rule for merchant: {}", key)));
        }
        Ok(())
    }

    /// List all merchant rules, alphabetical by key
    pub fn list_merchant_rules(&self) -> Result<Vec<MerchantRule>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, merchant_key, category, created_at
             FROM merchant_rules ORDER BY merchant_key ASC",
        )?;

        let rules = stmt
            .query_map([], |row| {
                let created_at_str: String = row.get(3)?;
                Ok(MerchantRule {
                    id: row.get(0)?,
                    merchant_key: row.get(1)?,
                    category: row.get(2)?,
                    created_at: parse_datetime(&created_at_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rules)
    }

    /// Count merchant rules
    pub fn count_merchant_rules(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM merchant_rules", [], |row| row.get(0))?;
        Ok(count)
    }
}
