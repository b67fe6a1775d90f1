//! Payment-account operations

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::PaymentAccount;

impl Database {
    /// Add a payment account; errors if the name already exists
    pub fn add_payment_account(&self, name: &str) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Account name is empty".to_string()));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO payment_accounts (name) VALUES (?)",
            params![name],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List payment accounts in creation order
    pub fn list_payment_accounts(&self) -> Result<Vec<PaymentAccount>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, created_at FROM payment_accounts ORDER BY id ASC",
        )?;

        let accounts = stmt
            .query_map([], |row| {
                let created_at_str: String = row.get(2)?;
                Ok(PaymentAccount {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: parse_datetime(&created_at_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(accounts)
    }

    /// Delete a payment account by ID
    pub fn delete_payment_account(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM payment_accounts WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("No payment account with id {}", id)));
        }
        Ok(())
    }
}
