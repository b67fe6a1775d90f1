//! Domain models for Paisa

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw SMS as delivered by the message source
///
/// Transient input; never persisted as-is. The same physical SMS may be
/// delivered more than once (broadcast redelivery) or re-read during a bulk
/// history import over an overlapping time window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessage {
    /// Originating address (e.g. "VM-HDFCBK")
    pub sender: String,
    /// Message text
    pub body: String,
    /// Delivery timestamp in epoch millis
    #[serde(rename = "timestamp")]
    pub received_at: i64,
}

impl RawMessage {
    pub fn new(sender: impl Into<String>, body: impl Into<String>, received_at: i64) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
            received_at,
        }
    }
}

/// Money movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Debit,
    Credit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debit" | "dr" => Ok(Self::Debit),
            "credit" | "cr" => Ok(Self::Credit),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment channel a transaction moved over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Upi,
    CreditCard,
    DebitCard,
    Cash,
    NetBanking,
    #[default]
    Online,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upi => "upi",
            Self::CreditCard => "credit_card",
            Self::DebitCard => "debit_card",
            Self::Cash => "cash",
            Self::NetBanking => "net_banking",
            Self::Online => "online",
        }
    }

    /// Human-readable label, also the fallback when no payment account matches
    pub fn label(&self) -> &'static str {
        match self {
            Self::Upi => "UPI",
            Self::CreditCard => "Credit Card",
            Self::DebitCard => "Debit Card",
            Self::Cash => "Cash",
            Self::NetBanking => "Net Banking",
            Self::Online => "Online",
        }
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upi" => Ok(Self::Upi),
            "credit_card" => Ok(Self::CreditCard),
            "debit_card" => Ok(Self::DebitCard),
            "cash" => Ok(Self::Cash),
            "net_banking" => Ok(Self::NetBanking),
            "online" => Ok(Self::Online),
            _ => Err(format!("Unknown channel: {}", s)),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a merchant name was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MerchantProvenance {
    /// Parsed out of the message body (VPA or contextual phrase)
    Body,
    /// Derived from the sender id as a last resort
    #[default]
    Sender,
}

impl MerchantProvenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Sender => "sender",
        }
    }
}

impl std::str::FromStr for MerchantProvenance {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "body" => Ok(Self::Body),
            "sender" => Ok(Self::Sender),
            _ => Err(format!("Unknown merchant provenance: {}", s)),
        }
    }
}

impl std::fmt::Display for MerchantProvenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fields pulled out of one accepted message
///
/// Built once per message that survives sender validation and noise
/// filtering; immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    /// Always positive; a message with no parseable positive amount is rejected
    pub amount: f64,
    pub direction: Direction,
    /// Raw merchant candidate, not yet normalized
    pub merchant: String,
    pub provenance: MerchantProvenance,
    pub channel: Channel,
    /// Parsed reference id, or a deterministic hash of sender|amount|timestamp
    pub reference: String,
}

/// A transaction ready for insertion (before dedup and DB assignment)
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub amount: f64,
    pub direction: Direction,
    pub category: String,
    pub channel: Channel,
    /// Resolved payment-account label
    pub account: String,
    /// Normalized merchant key
    pub merchant_key: String,
    pub provenance: MerchantProvenance,
    /// When the underlying transaction happened, epoch millis
    pub occurred_at: i64,
    pub reference_token: String,
    /// True when no merchant rule existed at extraction time
    pub needs_review: bool,
    /// True for pipeline-extracted records (vs. manual entry)
    pub auto_detected: bool,
    pub sender: Option<String>,
    /// Original message text, kept for reprocessing
    pub raw_body: Option<String>,
}

/// A stored financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub amount: f64,
    pub direction: Direction,
    pub category: String,
    pub channel: Channel,
    pub account: String,
    pub merchant_key: String,
    pub provenance: MerchantProvenance,
    pub occurred_at: i64,
    pub reference_token: String,
    pub needs_review: bool,
    pub auto_detected: bool,
    pub sender: Option<String>,
    pub raw_body: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A learned merchant→category mapping
///
/// Created or updated only by explicit user action (accepting or editing a
/// category); the pipeline consults it read-only and never overwrites it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantRule {
    pub id: i64,
    /// Normalized merchant key (unique)
    pub merchant_key: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// A user-configured payment account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAccount {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
