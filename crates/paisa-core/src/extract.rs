//! Regex field extraction for bank/UPI SMS bodies
//!
//! Every heuristic lives here as a named method on [`FieldExtractor`] so each
//! rule's precedence and exclusions are independently testable. The cascades
//! are first-match-wins: amount tries the currency-prefixed pattern before the
//! verb-anchored one, merchant tries VPA, then contextual phrase, then the
//! sender id. The open-coded exclusions (balance-clause stripping,
//! reference-keyword truncation) guard against real-world false positives;
//! a "simpler" equivalent without them misreads balance suffixes as
//! directions and reference numbers as merchants.

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::models::{Channel, Direction, ExtractedFields, MerchantProvenance, RawMessage};
use crate::sender;

/// Why extraction gave up on a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractError {
    /// No currency-prefixed or verb-anchored positive amount
    NoAmount,
    /// Direction keywords missing or ambiguous
    NoDirection,
}

/// Generic banking terms that disqualify a contextual merchant candidate
const MERCHANT_BLOCKLIST: &[&str] = &[
    "UPI", "IMPS", "NEFT", "RTGS", "ATM", "POS", "BANK", "BANKING", "ACCOUNT", "AC", "TXN",
    "TRANSACTION", "REF", "REFNO", "UTR", "RRN", "INFO", "CARD", "YOUR", "LINKED", "BAL",
    "BALANCE", "AVL", "MOBILE", "NO", "NUMBER", "CREDIT", "DEBIT",
];

/// Words that end a contextual merchant phrase
const MERCHANT_STOP_WORDS: &[&str] = &[
    "on", "via", "vide", "dated", "using", "for", "is", "has", "was", "at", "to", "from",
];

/// Compiled extraction patterns
///
/// Compile once per pipeline, never per message.
pub struct FieldExtractor {
    currency_amount: Regex,
    verb_amount: Regex,
    balance_clause: Regex,
    trailing_dr: Regex,
    trailing_cr: Regex,
    debit_words: Regex,
    credit_words: Regex,
    vpa: Regex,
    context_merchant: Regex,
    reference_cut: Regex,
    reference: Regex,
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self {
            // Rs./INR/₹/amt/amount followed by a decimal with 0-2 fraction
            // digits; commas permitted in the integer part
            currency_amount: Regex::new(
                r"(?:\brs\.?|\binr\b|₹|\bamount\b|\bamt\.?)\s*:?\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)",
            )
            .unwrap(),
            // Verb-anchored fallback: "debited by 500", "credited with 1200"
            verb_amount: Regex::new(
                r"\b(?:debited|credited|spent|paid|sent|received|purchased?|withdrawn|withdrew|refund(?:ed)?)\b\s+(?:by|with|to|of)\s+(?:rs\.?|inr|₹)?\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)",
            )
            .unwrap(),
            // Trailing balance statement; everything from the marker onward is
            // dropped before direction and merchant rules run so a suffix like
            // "Avl Bal Rs.100 CR" cannot be misread as the transaction itself
            balance_clause: Regex::new(
                r"(?i)\b(?:total|avl|avbl|available|clr)\.?\s*bal(?:ance)?\b[\s\S]*$",
            )
            .unwrap(),
            trailing_dr: Regex::new(r"\b[0-9][0-9,]*(?:\.[0-9]{1,2})?\s*dr\b").unwrap(),
            trailing_cr: Regex::new(r"\b[0-9][0-9,]*(?:\.[0-9]{1,2})?\s*cr\b").unwrap(),
            debit_words: Regex::new(
                r"\b(?:debited|spent|paid|sent|purchased?|withdrawn|withdrew|withdrawal|deducted)\b",
            )
            .unwrap(),
            credit_words: Regex::new(r"\b(?:credited|received|refund(?:ed)?|reversed|deposited)\b")
                .unwrap(),
            // UPI virtual payment address; matched against the raw body so the
            // local part keeps its spelling
            vpa: Regex::new(r"\b([A-Za-z0-9][A-Za-z0-9._\-]+)@([A-Za-z][A-Za-z0-9]+)\b").unwrap(),
            // "(to|at|paid to|spent on|trf to|from) <1-3 words>"
            context_merchant: Regex::new(
                r"(?i)\b(?:paid to|spent on|trf to|to|at|from)\s+([A-Za-z0-9][A-Za-z0-9&.'\-]+(?:\s+[A-Za-z0-9&.'\-]+){0,2})",
            )
            .unwrap(),
            // First reference/transaction-id keyword; merchant extraction
            // truncates the body here to avoid capturing reference numbers
            reference_cut: Regex::new(
                r"(?i)\b(?:utr|rrn|ref\s?no\.?|refno|txn\s?id|transaction\s?id|upi\s?ref|ref|txn)\b",
            )
            .unwrap(),
            reference: Regex::new(
                r"(?i)\b(?:utr|rrn|ref\s?no\.?|refno|txn\s?id|transaction\s?id|upi\s?ref|ref)\b[\s:.\-]*([A-Za-z0-9]{6,})",
            )
            .unwrap(),
        }
    }

    /// Extract all fields from a message that already passed sender
    /// validation and noise filtering
    ///
    /// Amount and direction are mandatory; either missing aborts extraction
    /// and the message is dropped. No partial records are ever produced.
    pub fn extract(&self, msg: &RawMessage) -> Result<ExtractedFields, ExtractError> {
        let lower = msg.body.to_lowercase();

        let amount = self.amount(&lower).ok_or(ExtractError::NoAmount)?;
        let direction = self.direction(&lower).ok_or(ExtractError::NoDirection)?;
        let (merchant, provenance) = self.merchant(msg);
        let channel = self.channel(&lower);
        let reference = self.reference(msg, amount);

        Ok(ExtractedFields {
            amount,
            direction,
            merchant,
            provenance,
            channel,
            reference,
        })
    }

    /// Parse the transaction amount from a lower-cased body
    ///
    /// Currency-prefixed pattern first, verb-anchored fallback second.
    /// Zero, negative, and unparseable amounts are rejected.
    pub fn amount(&self, body: &str) -> Option<f64> {
        let cap = self
            .currency_amount
            .captures(body)
            .or_else(|| self.verb_amount.captures(body))?;
        let raw = cap.get(1)?.as_str().replace(',', "");
        let amount: f64 = raw.parse().ok()?;
        if amount > 0.0 {
            Some(amount)
        } else {
            None
        }
    }

    /// Classify debit vs. credit from a lower-cased body
    ///
    /// The trailing balance clause is stripped first. An explicit
    /// "<amount> dr"/"<amount> cr" marker wins over keyword families;
    /// keyword classification requires exactly one family to match, with a
    /// literal debited/credited check as the final tie-break.
    pub fn direction(&self, body: &str) -> Option<Direction> {
        let stripped = self.balance_clause.replace(body, "");

        if self.trailing_dr.is_match(&stripped) {
            return Some(Direction::Debit);
        }
        if self.trailing_cr.is_match(&stripped) {
            return Some(Direction::Credit);
        }

        let debit = self.debit_words.is_match(&stripped);
        let credit = self.credit_words.is_match(&stripped);
        match (debit, credit) {
            (true, false) => Some(Direction::Debit),
            (false, true) => Some(Direction::Credit),
            _ => {
                if stripped.contains("debited") {
                    Some(Direction::Debit)
                } else if stripped.contains("credited") {
                    Some(Direction::Credit)
                } else {
                    None
                }
            }
        }
    }

    /// Find the merchant candidate, first-match-wins
    ///
    /// (a) a VPA local-part from the raw body, (b) a contextual phrase after
    /// reference-id and balance-clause stripping, (c) the bank name derived
    /// from the sender id.
    pub fn merchant(&self, msg: &RawMessage) -> (String, MerchantProvenance) {
        if let Some(cap) = self.vpa.captures(&msg.body) {
            if let Some(local) = cap.get(1) {
                return (local.as_str().to_uppercase(), MerchantProvenance::Body);
            }
        }

        let cut = match self.reference_cut.find(&msg.body) {
            Some(m) => &msg.body[..m.start()],
            None => msg.body.as_str(),
        };
        let cut = self.balance_clause.replace(cut, "");

        if let Some(cap) = self.context_merchant.captures(&cut) {
            if let Some(candidate) = cap.get(1) {
                if let Some(name) = self.clean_candidate(candidate.as_str()) {
                    return (name, MerchantProvenance::Body);
                }
            }
        }

        (
            sender::bank_name_from_sender(&msg.sender),
            MerchantProvenance::Sender,
        )
    }

    /// Trim a contextual candidate at the first stop word and reject it if
    /// anything left looks like generic banking vocabulary
    fn clean_candidate(&self, candidate: &str) -> Option<String> {
        let mut words = Vec::new();
        for word in candidate.split_whitespace() {
            if MERCHANT_STOP_WORDS.contains(&word.to_lowercase().as_str()) {
                break;
            }
            words.push(word);
        }
        if words.is_empty() {
            return None;
        }

        let has_letter = words
            .iter()
            .any(|w| w.chars().any(|c| c.is_ascii_alphabetic()));
        if !has_letter {
            return None;
        }

        for word in &words {
            let upper: String = word
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_uppercase();
            if MERCHANT_BLOCKLIST.contains(&upper.as_str()) {
                return None;
            }
        }

        Some(words.join(" "))
    }

    /// Payment channel by keyword precedence:
    /// UPI > credit card > debit card > ATM/withdraw > NEFT-family > Online
    pub fn channel(&self, body: &str) -> Channel {
        if body.contains("upi") {
            Channel::Upi
        } else if body.contains("credit card") {
            Channel::CreditCard
        } else if body.contains("debit card") {
            Channel::DebitCard
        } else if body.contains("atm") || body.contains("withdraw") {
            Channel::Cash
        } else if body.contains("neft")
            || body.contains("rtgs")
            || body.contains("imps")
            || body.contains("netbanking")
            || body.contains("net banking")
        {
            Channel::NetBanking
        } else {
            Channel::Online
        }
    }

    /// Parse the reference token, or synthesize a deterministic one
    ///
    /// The fallback hashes `sender|amount|timestamp` so true redeliveries of
    /// one physical SMS collapse to the same identity even when the text
    /// carries no reference number.
    pub fn reference(&self, msg: &RawMessage, amount: f64) -> String {
        if let Some(cap) = self.reference.captures(&msg.body) {
            if let Some(token) = cap.get(1) {
                return token.as_str().to_string();
            }
        }

        let mut hasher = Sha256::new();
        hasher.update(format!("{}|{:.2}|{}", msg.sender, amount, msg.received_at).as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..4])
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> FieldExtractor {
        FieldExtractor::new()
    }

    fn msg(sender: &str, body: &str) -> RawMessage {
        RawMessage::new(sender, body, 1_700_000_000_000)
    }

    // ===== amount =====

    #[test]
    fn test_amount_currency_prefixed() {
        let x = extractor();
        assert_eq!(x.amount("rs.500 debited from a/c"), Some(500.0));
        assert_eq!(x.amount("inr 1200 credited"), Some(1200.0));
        assert_eq!(x.amount("₹250.50 spent on card"), Some(250.50));
        assert_eq!(x.amount("amt: 99 paid"), Some(99.0));
        assert_eq!(x.amount("rs 1,23,456.78 debited"), Some(123456.78));
    }

    #[test]
    fn test_amount_verb_anchored_fallback() {
        let x = extractor();
        assert_eq!(x.amount("your account was debited by 500"), Some(500.0));
        assert_eq!(x.amount("credited with 1200.25 today"), Some(1200.25));
    }

    #[test]
    fn test_amount_missing_or_zero_rejected() {
        let x = extractor();
        assert_eq!(x.amount("your statement is ready"), None);
        assert_eq!(x.amount("rs.0 debited"), None);
    }

    #[test]
    fn test_amount_first_match_wins() {
        // Transaction amount precedes the balance figure
        let x = extractor();
        assert_eq!(
            x.amount("rs.500 debited from a/c xx1234 on 12-jan. avl bal rs.20000"),
            Some(500.0)
        );
    }

    // ===== direction =====

    #[test]
    fn test_direction_keywords() {
        let x = extractor();
        assert_eq!(x.direction("rs.500 debited from a/c"), Some(Direction::Debit));
        assert_eq!(x.direction("inr 1200 credited to your account"), Some(Direction::Credit));
        assert_eq!(x.direction("rs.90 spent at cafe"), Some(Direction::Debit));
        assert_eq!(x.direction("you have received rs.50"), Some(Direction::Credit));
    }

    #[test]
    fn test_direction_balance_suffix_not_misread() {
        // The trailing "CR" belongs to the balance statement, not the transaction
        let x = extractor();
        assert_eq!(
            x.direction("rs.500 debited from a/c xx1234 on 12-jan. avl bal rs.20000 cr"),
            Some(Direction::Debit)
        );
    }

    #[test]
    fn test_direction_explicit_trailing_markers() {
        let x = extractor();
        assert_eq!(x.direction("a/c xx1234: 500.00 dr on 12-jan"), Some(Direction::Debit));
        assert_eq!(x.direction("a/c xx1234: 999 cr via neft"), Some(Direction::Credit));
    }

    #[test]
    fn test_direction_trailing_marker_beats_keywords() {
        // "payment received" would match the credit family, but the explicit
        // DR marker is checked first
        let x = extractor();
        assert_eq!(
            x.direction("payment received towards your card. 450 dr from a/c"),
            Some(Direction::Debit)
        );
    }

    #[test]
    fn test_direction_ambiguous_falls_back_to_literal() {
        let x = extractor();
        // Both families match ("debited" + "refund"); the literal check breaks the tie
        assert_eq!(
            x.direction("rs.500 debited; refund will follow in 3 days"),
            Some(Direction::Debit)
        );
        assert_eq!(x.direction("thank you for banking with us"), None);
    }

    // ===== merchant =====

    #[test]
    fn test_merchant_vpa_wins() {
        let x = extractor();
        let m = msg("VM-HDFCBK", "INR 1200 credited to your account via UPI from john@upi");
        assert_eq!(x.merchant(&m), ("JOHN".to_string(), MerchantProvenance::Body));
    }

    #[test]
    fn test_merchant_vpa_keeps_local_part_only() {
        let x = extractor();
        let m = msg("VM-HDFCBK", "Rs.349 debited via UPI to swiggy.order@ybl");
        assert_eq!(
            x.merchant(&m),
            ("SWIGGY.ORDER".to_string(), MerchantProvenance::Body)
        );
    }

    #[test]
    fn test_merchant_contextual_phrase() {
        let x = extractor();
        let m = msg("VM-HDFCBK", "Rs.850 spent on ZOMATO using your card");
        assert_eq!(x.merchant(&m), ("ZOMATO".to_string(), MerchantProvenance::Body));

        let m = msg("VM-ICICIB", "Rs.2300 paid to Big Bazaar on 14-Feb");
        assert_eq!(
            x.merchant(&m),
            ("Big Bazaar".to_string(), MerchantProvenance::Body)
        );
    }

    #[test]
    fn test_merchant_reference_not_captured() {
        // Without the reference cut, "to" would capture the ref number's text
        let x = extractor();
        let m = msg("VM-SBIINB", "Rs.500 debited Ref no 987654321 transfer");
        assert_eq!(x.merchant(&m).1, MerchantProvenance::Sender);
        assert_eq!(x.merchant(&m).0, "SBI");
    }

    #[test]
    fn test_merchant_blocklisted_candidate_falls_through() {
        let x = extractor();
        // "your account" is generic banking text, not a merchant
        let m = msg("VM-HDFCBK", "INR 1200 credited to your account via NEFT");
        assert_eq!(x.merchant(&m), ("HDFC".to_string(), MerchantProvenance::Sender));
    }

    #[test]
    fn test_merchant_sender_fallback() {
        let x = extractor();
        let m = msg("AD-SBIINB-S", "Rs.500 debited on 12-Jan");
        assert_eq!(x.merchant(&m), ("SBI".to_string(), MerchantProvenance::Sender));
    }

    #[test]
    fn test_merchant_stop_word_trims_candidate() {
        let x = extractor();
        let m = msg("VM-AXISBK", "Rs.120 spent on STARBUCKS on 01-Mar via card");
        assert_eq!(
            x.merchant(&m),
            ("STARBUCKS".to_string(), MerchantProvenance::Body)
        );
    }

    // ===== channel =====

    #[test]
    fn test_channel_precedence() {
        let x = extractor();
        assert_eq!(x.channel("paid via upi to merchant"), Channel::Upi);
        assert_eq!(x.channel("spent using credit card"), Channel::CreditCard);
        assert_eq!(x.channel("purchase on debit card"), Channel::DebitCard);
        assert_eq!(x.channel("withdrawn at atm"), Channel::Cash);
        assert_eq!(x.channel("transferred via neft"), Channel::NetBanking);
        assert_eq!(x.channel("payment processed"), Channel::Online);
        // UPI outranks a card mention in the same message
        assert_eq!(x.channel("upi payment from credit card"), Channel::Upi);
    }

    // ===== reference =====

    #[test]
    fn test_reference_parsed_variants() {
        let x = extractor();
        let amount = 100.0;
        assert_eq!(
            x.reference(&msg("VM-HDFCBK", "credited Ref 123456789012"), amount),
            "123456789012"
        );
        assert_eq!(
            x.reference(&msg("VM-HDFCBK", "UTR: AXIS12345678 done"), amount),
            "AXIS12345678"
        );
        assert_eq!(
            x.reference(&msg("VM-HDFCBK", "UPI Ref no. 4021337766"), amount),
            "4021337766"
        );
    }

    #[test]
    fn test_reference_too_short_ignored() {
        // Tokens under 6 chars are noise; the fallback hash takes over
        let x = extractor();
        let token = x.reference(&msg("VM-HDFCBK", "debited Ref 123"), 100.0);
        assert_eq!(token.len(), 8);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_reference_fallback_deterministic() {
        let x = extractor();
        let m = msg("VM-HDFCBK", "Rs.500 debited");
        let a = x.reference(&m, 500.0);
        let b = x.reference(&m, 500.0);
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);

        // Different timestamp, different identity
        let later = RawMessage::new("VM-HDFCBK", "Rs.500 debited", 1_700_000_060_000);
        assert_ne!(a, x.reference(&later, 500.0));
    }

    // ===== full extraction =====

    #[test]
    fn test_extract_credit_via_upi() {
        let x = extractor();
        let m = msg(
            "VM-HDFCBK",
            "INR 1200 credited to your account via UPI from john@upi Ref 123456789012",
        );
        let fields = x.extract(&m).unwrap();
        assert_eq!(fields.amount, 1200.0);
        assert_eq!(fields.direction, Direction::Credit);
        assert_eq!(fields.merchant, "JOHN");
        assert_eq!(fields.provenance, MerchantProvenance::Body);
        assert_eq!(fields.channel, Channel::Upi);
        assert_eq!(fields.reference, "123456789012");
    }

    #[test]
    fn test_extract_debit_with_balance_suffix() {
        let x = extractor();
        let m = msg(
            "VM-SBIINB",
            "Rs.500 debited from A/c XX1234 on 12-Jan. Avl Bal Rs.20000 CR",
        );
        let fields = x.extract(&m).unwrap();
        assert_eq!(fields.amount, 500.0);
        assert_eq!(fields.direction, Direction::Debit);
    }

    #[test]
    fn test_extract_rejects_missing_fields() {
        let x = extractor();
        assert_eq!(
            x.extract(&msg("VM-HDFCBK", "Your statement is ready")),
            Err(ExtractError::NoAmount)
        );
        assert_eq!(
            x.extract(&msg("VM-HDFCBK", "Rs.500 towards your account")),
            Err(ExtractError::NoDirection)
        );
    }
}
