//! Transaction operations
//!
//! Insertion runs the duplicate check and the write inside one IMMEDIATE
//! SQLite transaction: two near-simultaneous deliveries of the same SMS must
//! not both pass the existence check before either inserts.

use rusqlite::{params, OptionalExtension, TransactionBehavior};
use tracing::debug;

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{NewTransaction, Transaction};

/// Duplicate-suppression window for the merchant+amount+direction check, in millis
const DEDUP_WINDOW_MS: i64 = 30_000;

/// Result of inserting a transaction
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    /// Transaction was inserted, contains new transaction ID
    Inserted(i64),
    /// An equivalent transaction already existed, contains its ID
    Duplicate(i64),
}

impl Database {
    /// Insert a transaction unless an equivalent one already exists
    ///
    /// A stored row is equivalent when it has the same reference token, or the
    /// same merchant+amount+direction within [`DEDUP_WINDOW_MS`] of the
    /// candidate's timestamp. Whichever check fires first blocks the insert;
    /// duplicates are silent (debug trace only). The UNIQUE index on
    /// reference_token backs the same guarantee across pool connections.
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<InsertOutcome> {
        let mut conn = self.conn()?;
        let dbtx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let by_reference: Option<i64> = dbtx
            .query_row(
                "SELECT id FROM transactions WHERE reference_token = ?",
                params![tx.reference_token],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(existing_id) = by_reference {
            debug!(
                "Duplicate by reference token {} (existing id {})",
                tx.reference_token, existing_id
            );
            return Ok(InsertOutcome::Duplicate(existing_id));
        }

        let by_signature: Option<i64> = dbtx
            .query_row(
                r#"
                SELECT id FROM transactions
                WHERE merchant_key = ? AND amount = ? AND direction = ? AND occurred_at >= ?
                "#,
                params![
                    tx.merchant_key,
                    tx.amount,
                    tx.direction.as_str(),
                    tx.occurred_at - DEDUP_WINDOW_MS,
                ],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(existing_id) = by_signature {
            debug!(
                "Duplicate by signature {}/{}/{} within window (existing id {})",
                tx.merchant_key, tx.amount, tx.direction, existing_id
            );
            return Ok(InsertOutcome::Duplicate(existing_id));
        }

        dbtx.execute(
            r#"
            INSERT INTO transactions (amount, direction, category, channel, account, merchant_key,
                                      provenance, occurred_at, reference_token, needs_review,
                                      auto_detected, sender, raw_body)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.amount,
                tx.direction.as_str(),
                tx.category,
                tx.channel.as_str(),
                tx.account,
                tx.merchant_key,
                tx.provenance.as_str(),
                tx.occurred_at,
                tx.reference_token,
                tx.needs_review,
                tx.auto_detected,
                tx.sender,
                tx.raw_body,
            ],
        )?;

        let id = dbtx.last_insert_rowid();
        dbtx.commit()?;
        Ok(InsertOutcome::Inserted(id))
    }

    /// List transactions, newest first
    pub fn list_transactions(&self, limit: i64, offset: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, amount, direction, category, channel, account, merchant_key, provenance,
                    occurred_at, reference_token, needs_review, auto_detected, sender, raw_body, created_at
             FROM transactions
             ORDER BY occurred_at DESC, id DESC
             LIMIT ? OFFSET ?",
        )?;

        let transactions = stmt
            .query_map(params![limit, offset], |row| Self::row_to_transaction(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Get transactions in the half-open range [start, end), epoch millis
    pub fn transactions_between(&self, start: i64, end: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, amount, direction, category, channel, account, merchant_key, provenance,
                    occurred_at, reference_token, needs_review, auto_detected, sender, raw_body, created_at
             FROM transactions
             WHERE occurred_at >= ? AND occurred_at < ?
             ORDER BY occurred_at ASC, id ASC",
        )?;

        let transactions = stmt
            .query_map(params![start, end], |row| Self::row_to_transaction(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Get a single transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, amount, direction, category, channel, account, merchant_key, provenance,
                    occurred_at, reference_token, needs_review, auto_detected, sender, raw_body, created_at
             FROM transactions WHERE id = ?",
        )?;

        let transaction = stmt
            .query_row(params![id], |row| Self::row_to_transaction(row))
            .optional()?;

        Ok(transaction)
    }

    /// Count total transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Count transactions whose category still needs user confirmation
    pub fn count_needs_review(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE needs_review = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Helper to convert a row to Transaction
    /// Column order: id, amount, direction, category, channel, account, merchant_key,
    ///               provenance, occurred_at, reference_token, needs_review,
    ///               auto_detected, sender, raw_body, created_at
    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let direction_str: String = row.get(2)?;
        let channel_str: String = row.get(4)?;
        let provenance_str: String = row.get(7)?;
        let needs_review_int: i64 = row.get(10)?;
        let auto_detected_int: i64 = row.get(11)?;
        let created_at_str: String = row.get(14)?;
        Ok(Transaction {
            id: row.get(0)?,
            amount: row.get(1)?,
            direction: direction_str.parse().unwrap_or_default(),
            category: row.get(3)?,
            channel: channel_str.parse().unwrap_or_default(),
            account: row.get(5)?,
            merchant_key: row.get(6)?,
            provenance: provenance_str.parse().unwrap_or_default(),
            occurred_at: row.get(8)?,
            reference_token: row.get(9)?,
            needs_review: needs_review_int != 0,
            auto_detected: auto_detected_int != 0,
            sender: row.get(12)?,
            raw_body: row.get(13)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
