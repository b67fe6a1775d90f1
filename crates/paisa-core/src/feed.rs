//! Message feeds for bulk history import
//!
//! Two on-disk formats, auto-detected from the first line:
//! - JSON: an array of `{"sender", "body", "timestamp"}` objects, the shape
//!   most SMS backup apps export
//! - CSV: `sender,body,timestamp` with a header row
//!
//! Individual malformed records are counted and skipped; a bulk import
//! reports partial results rather than failing outright.

use std::io::Read;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::RawMessage;

/// Supported feed file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Json,
    Csv,
}

impl FeedFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl std::str::FromStr for FeedFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("Unknown feed format: {}", s)),
        }
    }
}

impl std::fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed feed plus per-record recovery stats
#[derive(Debug, Clone)]
pub struct FeedReport {
    pub messages: Vec<RawMessage>,
    /// Records that failed to parse and were skipped
    pub skipped: usize,
}

/// Detect the feed format from the first line of the file
///
/// Returns None if the line looks like neither format.
pub fn detect_feed_format(first_line: &str) -> Option<FeedFormat> {
    let trimmed = first_line.trim_start_matches('\u{feff}').trim();

    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return Some(FeedFormat::Json);
    }

    // CSV header: "sender,body,timestamp" in any column order
    let lower = trimmed.to_lowercase();
    if lower.contains("sender") && lower.contains("body") && lower.contains("timestamp") {
        return Some(FeedFormat::Csv);
    }

    None
}

/// Parse feed data in the given format
pub fn parse_feed<R: Read>(reader: R, format: FeedFormat) -> Result<FeedReport> {
    match format {
        FeedFormat::Json => parse_json(reader),
        FeedFormat::Csv => parse_csv(reader),
    }
}

/// Parse a JSON array feed
///
/// The array itself must parse; each element is converted individually so one
/// malformed object skips that record only.
fn parse_json<R: Read>(reader: R) -> Result<FeedReport> {
    let values: Vec<serde_json::Value> = serde_json::from_reader(reader)?;

    let mut messages = Vec::with_capacity(values.len());
    let mut skipped = 0;

    for value in values {
        match serde_json::from_value::<RawMessage>(value) {
            Ok(msg) => messages.push(msg),
            Err(e) => {
                debug!("Skipping malformed feed record: {}", e);
                skipped += 1;
            }
        }
    }

    debug!("Parsed {} JSON feed messages ({} skipped)", messages.len(), skipped);
    Ok(FeedReport { messages, skipped })
}

/// Parse a CSV feed with a sender,body,timestamp header
fn parse_csv<R: Read>(reader: R) -> Result<FeedReport> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let sender_col = column_index(&headers, "sender")?;
    let body_col = column_index(&headers, "body")?;
    let timestamp_col = column_index(&headers, "timestamp")?;

    let mut messages = Vec::new();
    let mut skipped = 0;

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping unreadable CSV record: {}", e);
                skipped += 1;
                continue;
            }
        };

        let sender = record.get(sender_col).unwrap_or("").trim();
        let body = record.get(body_col).unwrap_or("").trim();
        let timestamp = record
            .get(timestamp_col)
            .and_then(|s| s.trim().parse::<i64>().ok());

        match (sender.is_empty(), body.is_empty(), timestamp) {
            (false, false, Some(ts)) => messages.push(RawMessage::new(sender, body, ts)),
            _ => {
                debug!("Skipping incomplete CSV record");
                skipped += 1;
            }
        }
    }

    debug!("Parsed {} CSV feed messages ({} skipped)", messages.len(), skipped);
    Ok(FeedReport { messages, skipped })
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| Error::Feed(format!("Missing column in feed header: {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_json() {
        assert_eq!(detect_feed_format("[{\"sender\":"), Some(FeedFormat::Json));
        assert_eq!(detect_feed_format("  [  "), Some(FeedFormat::Json));
    }

    #[test]
    fn test_detect_csv() {
        assert_eq!(
            detect_feed_format("sender,body,timestamp"),
            Some(FeedFormat::Csv)
        );
        assert_eq!(
            detect_feed_format("Timestamp,Sender,Body"),
            Some(FeedFormat::Csv)
        );
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(detect_feed_format("Date,Description,Amount"), None);
    }

    #[test]
    fn test_parse_json_feed() {
        let json = r#"[
            {"sender":"VM-HDFCBK","body":"Rs.500 debited","timestamp":1700000000000},
            {"sender":"VM-ICICIB","body":"INR 75 credited","timestamp":1700000001000}
        ]"#;

        let report = parse_feed(json.as_bytes(), FeedFormat::Json).unwrap();
        assert_eq!(report.messages.len(), 2);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.messages[0].sender, "VM-HDFCBK");
        assert_eq!(report.messages[1].received_at, 1_700_000_001_000);
    }

    #[test]
    fn test_parse_json_skips_malformed_records() {
        let json = r#"[
            {"sender":"VM-HDFCBK","body":"Rs.500 debited","timestamp":1700000000000},
            {"sender":"VM-BROKEN","body":"no timestamp"},
            {"sender":"VM-ICICIB","body":"INR 75 credited","timestamp":1700000001000}
        ]"#;

        let report = parse_feed(json.as_bytes(), FeedFormat::Json).unwrap();
        assert_eq!(report.messages.len(), 2);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_parse_csv_feed() {
        let csv = "sender,body,timestamp\n\
                   VM-HDFCBK,\"Rs.500 debited from A/c, thank you\",1700000000000\n\
                   VM-ICICIB,INR 75 credited,1700000001000\n";

        let report = parse_feed(csv.as_bytes(), FeedFormat::Csv).unwrap();
        assert_eq!(report.messages.len(), 2);
        assert_eq!(report.skipped, 0);
        assert!(report.messages[0].body.contains("thank you"));
    }

    #[test]
    fn test_parse_csv_reordered_columns_and_bad_rows() {
        let csv = "timestamp,sender,body\n\
                   1700000000000,VM-HDFCBK,Rs.500 debited\n\
                   not-a-number,VM-ICICIB,INR 75 credited\n\
                   1700000002000,,empty sender\n";

        let report = parse_feed(csv.as_bytes(), FeedFormat::Csv).unwrap();
        assert_eq!(report.messages.len(), 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.messages[0].received_at, 1_700_000_000_000);
    }

    #[test]
    fn test_parse_csv_missing_column_errors() {
        let csv = "sender,text\nVM-HDFCBK,hello\n";
        assert!(parse_feed(csv.as_bytes(), FeedFormat::Csv).is_err());
    }
}
