//! Sender-id validation and bank-name derivation
//!
//! Financial institutions send from short alphanumeric DLT headers like
//! `VM-HDFCBK` or `AD-SBIUPI-S`. Plain phone numbers never carry bank
//! notifications, so a purely numeric sender is rejected outright before any
//! text rules run.

/// Alert sources that look like bank short-codes but are not banks
/// (stock exchanges, depositories, telecom regulator).
const NON_BANK_KEYWORDS: &[&str] = &["NSE", "BSE", "CDSL", "NSDL", "SEBI", "TRAI"];

/// Suffix words routinely appended to bank sender ids
const BANK_SUFFIXES: &[&str] = &["BANK", "ALERT", "INFO", "INB", "SMS", "TXN", "BK"];

/// Decide whether a sender id plausibly belongs to a financial institution
///
/// Accepts hyphen-delimited short-codes with an alphanumeric segment of at
/// least 2 characters (`XX-BANKID`), or any other sender of length >= 3.
pub fn is_financial_sender(sender: &str) -> bool {
    let sender = sender.trim();
    if sender.is_empty() {
        return false;
    }

    // Phone numbers (optionally with a + prefix) are person-to-person traffic
    let digits = sender.strip_prefix('+').unwrap_or(sender);
    if digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let upper = sender.to_uppercase();
    if NON_BANK_KEYWORDS.iter().any(|kw| upper.contains(kw)) {
        return false;
    }

    if sender.contains('-') {
        return sender
            .split('-')
            .any(|seg| seg.len() >= 2 && seg.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    sender.len() >= 3
}

/// Derive a bank-name fragment from a sender id
///
/// Strips the routing prefix (and DLT suffix letter), then peels recognized
/// banking suffix words: `VM-HDFCBK` -> `HDFC`, `AD-SBIINB-S` -> `SBI`.
/// Falls back to the cleaned segment itself when nothing remains.
pub fn bank_name_from_sender(sender: &str) -> String {
    let upper = sender.trim().to_uppercase();

    // The code segment is the longest hyphen-delimited part; routing prefixes
    // and DLT suffixes are 1-2 characters.
    let segment = upper
        .split('-')
        .filter(|seg| !seg.is_empty())
        .max_by_key(|seg| seg.len())
        .unwrap_or("");

    let mut name = segment;
    loop {
        let before = name;
        for suffix in BANK_SUFFIXES {
            if name.len() > suffix.len() {
                if let Some(stripped) = name.strip_suffix(suffix) {
                    name = stripped;
                }
            }
        }
        if name == before {
            break;
        }
    }

    if name.is_empty() {
        segment.to_string()
    } else {
        name.to_string()
    }
}
