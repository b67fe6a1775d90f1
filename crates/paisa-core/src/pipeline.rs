//! The SMS-to-transaction pipeline
//!
//! Stage order per message: sender validation → noise filtering → field
//! extraction → merchant normalization and category lookup → payment-account
//! resolution → duplicate-suppressed insert. Rejections at any stage are
//! normal outcomes (debug trace, no record); only persistence failures
//! surface as errors.

use tracing::{debug, warn};

use crate::db::{Database, InsertOutcome};
use crate::error::Result;
use crate::extract::{ExtractError, FieldExtractor};
use crate::merchant::normalize_key;
use crate::models::{NewTransaction, PaymentAccount, RawMessage};
use crate::noise::{NoiseFilter, NoiseKind};
use crate::sender;

/// Default category for merchants with no learned rule
const DEFAULT_CATEGORY: &str = "Other";

/// Why a message produced no transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Sender does not look like a financial institution
    Sender,
    /// Matched a noise-suppression pass
    Noise(NoiseKind),
    /// No parseable positive amount
    MissingAmount,
    /// Direction keywords missing or ambiguous
    MissingDirection,
}

/// Per-message pipeline result
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A new transaction was persisted
    Inserted(i64),
    /// An equivalent transaction already existed
    Duplicate(i64),
    /// The message was dropped before persistence
    Rejected(RejectReason),
}

/// Summary of one batch run
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub processed: i64,
    pub inserted: i64,
    pub duplicates: i64,
    pub rejected_noise: i64,
    pub rejected_unparseable: i64,
}

impl IngestReport {
    fn record(&mut self, outcome: &Outcome) {
        self.processed += 1;
        match outcome {
            Outcome::Inserted(_) => self.inserted += 1,
            Outcome::Duplicate(_) => self.duplicates += 1,
            Outcome::Rejected(RejectReason::Sender) | Outcome::Rejected(RejectReason::Noise(_)) => {
                self.rejected_noise += 1
            }
            Outcome::Rejected(RejectReason::MissingAmount)
            | Outcome::Rejected(RejectReason::MissingDirection) => self.rejected_unparseable += 1,
        }
    }
}

impl std::fmt::Display for IngestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} processed: {} inserted, {} duplicates, {} noise, {} unparseable",
            self.processed, self.inserted, self.duplicates, self.rejected_noise, self.rejected_unparseable
        )
    }
}

/// Message-processing engine
///
/// Takes its store handle as an explicit constructor parameter; compiled
/// patterns are built once here and shared across every message. The pipeline
/// is `Send + Sync`, so independent batches may run on concurrent threads
/// against clones of the same pooled [`Database`].
pub struct MessagePipeline<'a> {
    db: &'a Database,
    extractor: FieldExtractor,
    noise: NoiseFilter,
}

impl<'a> MessagePipeline<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            extractor: FieldExtractor::new(),
            noise: NoiseFilter::new(),
        }
    }

    /// Process a single raw message
    ///
    /// Returns `Ok(Rejected(..))` for messages dropped by validation or
    /// extraction; `Err` only for store failures, which the caller may retry
    /// at the transport layer.
    pub fn process(&self, msg: &RawMessage) -> Result<Outcome> {
        if !sender::is_financial_sender(&msg.sender) {
            debug!("Rejected non-financial sender: {}", msg.sender);
            return Ok(Outcome::Rejected(RejectReason::Sender));
        }

        let lower = msg.body.to_lowercase();
        if let Some(kind) = self.noise.check(&lower) {
            debug!("Rejected as {}: {}", kind, msg.sender);
            return Ok(Outcome::Rejected(RejectReason::Noise(kind)));
        }

        let fields = match self.extractor.extract(msg) {
            Ok(fields) => fields,
            Err(ExtractError::NoAmount) => {
                debug!("No amount in message from {}", msg.sender);
                return Ok(Outcome::Rejected(RejectReason::MissingAmount));
            }
            Err(ExtractError::NoDirection) => {
                debug!("No direction in message from {}", msg.sender);
                return Ok(Outcome::Rejected(RejectReason::MissingDirection));
            }
        };

        let merchant_key = normalize_key(&fields.merchant);

        // Category snapshot: a rule added later never reclassifies this record
        let (category, needs_review) = match self.db.lookup_merchant_rule(&merchant_key)? {
            Some(category) => (category, false),
            None => (DEFAULT_CATEGORY.to_string(), true),
        };

        // Account resolution always works from the sender-derived bank name,
        // regardless of which merchant path fired
        let bank = sender::bank_name_from_sender(&msg.sender);
        let accounts = self.db.list_payment_accounts()?;
        let account = resolve_account(&bank, &accounts)
            .unwrap_or_else(|| fields.channel.label().to_string());

        let tx = NewTransaction {
            amount: fields.amount,
            direction: fields.direction,
            category,
            channel: fields.channel,
            account,
            merchant_key,
            provenance: fields.provenance,
            occurred_at: msg.received_at,
            reference_token: fields.reference,
            needs_review,
            auto_detected: true,
            sender: Some(msg.sender.clone()),
            raw_body: Some(msg.body.clone()),
        };

        match self.db.insert_transaction(&tx)? {
            InsertOutcome::Inserted(id) => Ok(Outcome::Inserted(id)),
            InsertOutcome::Duplicate(id) => Ok(Outcome::Duplicate(id)),
        }
    }

    /// Process a batch of messages, one report for the lot
    ///
    /// Rejected messages never abort the batch. A store failure does: it
    /// surfaces to the caller for transport-level retry. Partial progress is
    /// acceptable and leaves the store consistent, since each message
    /// commits independently.
    pub fn process_batch(&self, messages: &[RawMessage]) -> Result<IngestReport> {
        let mut report = IngestReport::default();

        for msg in messages {
            match self.process(msg) {
                Ok(outcome) => report.record(&outcome),
                Err(e) => {
                    warn!("Failed to persist message from {}: {}", msg.sender, e);
                    return Err(e);
                }
            }
        }

        Ok(report)
    }
}

/// Match a sender-derived bank fragment against the user's payment accounts
///
/// An account matches when its name contains the fragment, the fragment
/// contains the name, or the name with the literal substring "BANK" removed
/// contains the fragment ("SBI" matches an account named "SBI Bank").
/// First match wins.
pub fn resolve_account(fragment: &str, accounts: &[PaymentAccount]) -> Option<String> {
    let fragment = fragment.trim().to_uppercase();
    if fragment.is_empty() {
        return None;
    }

    for account in accounts {
        let name = account.name.to_uppercase();
        if name.contains(&fragment)
            || fragment.contains(&name)
            || name.replace("BANK", "").trim().contains(&fragment)
        {
            return Some(account.name.clone());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Channel, Direction};

    fn setup() -> Database {
        Database::in_memory().unwrap()
    }

    fn msg(sender: &str, body: &str, at: i64) -> RawMessage {
        RawMessage::new(sender, body, at)
    }

    #[test]
    fn test_process_accepts_and_persists() {
        let db = setup();
        let pipeline = MessagePipeline::new(&db);

        let outcome = pipeline
            .process(&msg(
                "VM-HDFCBK",
                "INR 1200 credited to your account via UPI from john@upi Ref 123456789012",
                1_700_000_000_000,
            ))
            .unwrap();

        let id = match outcome {
            Outcome::Inserted(id) => id,
            other => panic!("expected insert, got {:?}", other),
        };

        let tx = db.get_transaction(id).unwrap().unwrap();
        assert_eq!(tx.amount, 1200.0);
        assert_eq!(tx.direction, Direction::Credit);
        assert_eq!(tx.merchant_key, "JOHN");
        assert_eq!(tx.channel, Channel::Upi);
        assert_eq!(tx.reference_token, "123456789012");
        assert!(tx.needs_review);
        assert!(tx.auto_detected);
    }

    #[test]
    fn test_process_rejects_noise_and_bad_senders() {
        let db = setup();
        let pipeline = MessagePipeline::new(&db);

        let outcome = pipeline
            .process(&msg("9876543210", "Rs.500 debited", 0))
            .unwrap();
        assert!(matches!(outcome, Outcome::Rejected(RejectReason::Sender)));

        let outcome = pipeline
            .process(&msg("VM-HDFCBK", "Your OTP is 4455", 0))
            .unwrap();
        assert!(matches!(
            outcome,
            Outcome::Rejected(RejectReason::Noise(NoiseKind::SecurityAlert))
        ));

        assert_eq!(db.count_transactions().unwrap(), 0);
    }

    #[test]
    fn test_category_snapshot_from_rule() {
        let db = setup();
        db.upsert_merchant_rule("JOHN", "Friends").unwrap();
        let pipeline = MessagePipeline::new(&db);

        let outcome = pipeline
            .process(&msg(
                "VM-HDFCBK",
                "INR 1200 credited via UPI from john@upi Ref 123456789012",
                1_700_000_000_000,
            ))
            .unwrap();

        let id = match outcome {
            Outcome::Inserted(id) => id,
            other => panic!("expected insert, got {:?}", other),
        };
        let tx = db.get_transaction(id).unwrap().unwrap();
        assert_eq!(tx.category, "Friends");
        assert!(!tx.needs_review);
    }

    #[test]
    fn test_rule_added_later_does_not_reclassify() {
        let db = setup();
        let pipeline = MessagePipeline::new(&db);

        let outcome = pipeline
            .process(&msg(
                "VM-ICICIB",
                "Rs.999 spent on AMAZON via credit card Ref 555666777888",
                1_700_000_000_000,
            ))
            .unwrap();
        let id = match outcome {
            Outcome::Inserted(id) => id,
            other => panic!("expected insert, got {:?}", other),
        };

        db.upsert_merchant_rule("AMAZON", "Shopping").unwrap();

        // Stored record keeps its snapshot
        let tx = db.get_transaction(id).unwrap().unwrap();
        assert_eq!(tx.category, "Other");
        assert!(tx.needs_review);

        // But a new extraction for the same merchant benefits
        let outcome = pipeline
            .process(&msg(
                "VM-ICICIB",
                "Rs.450 spent on AMAZON via credit card Ref 999000111222",
                1_700_000_100_000,
            ))
            .unwrap();
        let id = match outcome {
            Outcome::Inserted(id) => id,
            other => panic!("expected insert, got {:?}", other),
        };
        let tx = db.get_transaction(id).unwrap().unwrap();
        assert_eq!(tx.category, "Shopping");
        assert!(!tx.needs_review);
    }

    #[test]
    fn test_idempotent_redelivery() {
        let db = setup();
        let pipeline = MessagePipeline::new(&db);

        let m = msg(
            "VM-HDFCBK",
            "Rs.500 debited from A/c XX1234 on 12-Jan",
            1_700_000_000_000,
        );
        assert!(matches!(pipeline.process(&m).unwrap(), Outcome::Inserted(_)));
        assert!(matches!(pipeline.process(&m).unwrap(), Outcome::Duplicate(_)));
        assert_eq!(db.count_transactions().unwrap(), 1);
    }

    #[test]
    fn test_account_resolution_prefers_configured_account() {
        let db = setup();
        db.add_payment_account("SBI Bank").unwrap();
        let pipeline = MessagePipeline::new(&db);

        let outcome = pipeline
            .process(&msg(
                "AD-SBIINB-S",
                "Rs.500 debited from A/c XX1234 via NEFT Ref 246813579000",
                1_700_000_000_000,
            ))
            .unwrap();
        let id = match outcome {
            Outcome::Inserted(id) => id,
            other => panic!("expected insert, got {:?}", other),
        };
        let tx = db.get_transaction(id).unwrap().unwrap();
        assert_eq!(tx.account, "SBI Bank");
    }

    #[test]
    fn test_account_falls_back_to_channel_label() {
        let db = setup();
        let pipeline = MessagePipeline::new(&db);

        let outcome = pipeline
            .process(&msg(
                "VM-HDFCBK",
                "Rs.150 debited via UPI to chai.wala@ybl Ref 135792468000",
                1_700_000_000_000,
            ))
            .unwrap();
        let id = match outcome {
            Outcome::Inserted(id) => id,
            other => panic!("expected insert, got {:?}", other),
        };
        let tx = db.get_transaction(id).unwrap().unwrap();
        assert_eq!(tx.account, "UPI");
    }

    #[test]
    fn test_batch_survives_malformed_messages() {
        let db = setup();
        let pipeline = MessagePipeline::new(&db);

        let messages = vec![
            msg("VM-HDFCBK", "Rs.500 debited from A/c Ref 111222333444", 1_000_000),
            msg("VM-HDFCBK", "complete garbage ###", 2_000_000),
            msg("9876543210", "Rs.100 debited", 3_000_000),
            msg("VM-ICICIB", "Your OTP is 9876", 4_000_000),
            msg("VM-AXISBK", "INR 75 credited via UPI from tea@okaxis Ref 555666777000", 5_000_000),
        ];

        let report = pipeline.process_batch(&messages).unwrap();
        assert_eq!(report.processed, 5);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.rejected_noise, 2);
        assert_eq!(report.rejected_unparseable, 1);
        assert_eq!(db.count_transactions().unwrap(), 2);
    }

    #[test]
    fn test_resolve_account_matching_rules() {
        let accounts = vec![
            PaymentAccount {
                id: 1,
                name: "SBI Bank".to_string(),
                created_at: chrono::Utc::now(),
            },
            PaymentAccount {
                id: 2,
                name: "HDFC Savings".to_string(),
                created_at: chrono::Utc::now(),
            },
        ];

        // Name contains fragment ("SBI Bank" vs "SBI")
        assert_eq!(resolve_account("SBI", &accounts), Some("SBI Bank".to_string()));
        // First match wins in account order
        assert_eq!(resolve_account("HDFC", &accounts), Some("HDFC Savings".to_string()));
        // Fragment contains name
        assert_eq!(
            resolve_account("HDFC SAVINGS NRO", &accounts),
            Some("HDFC Savings".to_string())
        );
        // No match
        assert_eq!(resolve_account("KOTAK", &accounts), None);
        assert_eq!(resolve_account("", &accounts), None);
    }
}
