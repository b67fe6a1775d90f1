//! Paisa Core Library
//!
//! Shared functionality for the Paisa SMS expense tracker:
//! - Database access and migrations
//! - Sender validation and noise filtering for bank/UPI SMS
//! - Regex field extraction (amount, direction, merchant, channel, reference)
//! - Merchant-key normalization and learned category rules
//! - Duplicate suppression for at-least-once message delivery
//! - JSON/CSV message feeds for bulk history import

pub mod db;
pub mod error;
pub mod extract;
pub mod feed;
pub mod merchant;
pub mod models;
pub mod noise;
pub mod pipeline;
pub mod sender;

pub use db::{Database, InsertOutcome};
pub use error::{Error, Result};
pub use extract::{ExtractError, FieldExtractor};
pub use feed::{detect_feed_format, parse_feed, FeedFormat, FeedReport};
pub use noise::{NoiseFilter, NoiseKind};
pub use pipeline::{IngestReport, MessagePipeline, Outcome, RejectReason};
