//! Noise filtering for non-transactional bank SMS
//!
//! Two independent rejection passes run before any field extraction:
//! security/OTP suppression and intent suppression (mandates, recharge
//! confirmations, approval prompts, IPO fund blocks). Both operate on the
//! lower-cased body and short-circuit on first match.

use regex::Regex;

/// Which suppression pass rejected a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseKind {
    /// OTP / verification-code message with no transaction keyword
    SecurityAlert,
    /// Account activity that is not a realized transaction
    /// (recharge confirmation, mandate/autopay setup, payment request, IPO block)
    NonTransactionIntent,
}

impl NoiseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityAlert => "security_alert",
            Self::NonTransactionIntent => "non_transaction_intent",
        }
    }
}

impl std::fmt::Display for NoiseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compiled noise patterns
///
/// Compile once and reuse across messages. All patterns are literals;
/// construction cannot fail.
pub struct NoiseFilter {
    security: Regex,
    transaction: Regex,
    recharge: Regex,
    debit_marker: Regex,
    intent: Regex,
}

impl NoiseFilter {
    pub fn new() -> Self {
        Self {
            security: Regex::new(
                r"\b(?:otp|one[ -]?time password|(?:verification|security|secret|auth|login) code)\b",
            )
            .unwrap(),
            // Transaction keywords, including bare dr/cr tokens. The security
            // pass rejects only when NONE of these appear: many genuine
            // transaction alerts carry a "never share your OTP" footer.
            transaction: Regex::new(
                r"\b(?:debited|credited|spent|paid|sent|received|purchased?|withdrawn?|withdrawal|refund(?:ed)?|reversed|dr|cr)\b",
            )
            .unwrap(),
            recharge: Regex::new(r"\brecharge(?:d)?\b").unwrap(),
            debit_marker: Regex::new(r"\b(?:debited|debit|deducted|dr)\b").unwrap(),
            intent: Regex::new(
                r"payment request|collect request|has requested|requested money|\be-?mandate\b|\bmandate\b|\bautopay\b|auto-pay|standing instruction|subscription (?:request|set ?up)|to approve|approve (?:the )?(?:payment|request)|approval pending|\b(?:ipo|asba)\b|amount blocked|funds? blocked",
            )
            .unwrap(),
        }
    }

    /// Check a lower-cased message body against both suppression passes
    ///
    /// Returns the pass that fired, or None for messages worth extracting.
    pub fn check(&self, body: &str) -> Option<NoiseKind> {
        // Pass 1: security keyword present AND no transaction keyword.
        // The conjunction matters; presence alone would drop real
        // transactions that append a security footer.
        if self.security.is_match(body) && !self.transaction.is_match(body) {
            return Some(NoiseKind::SecurityAlert);
        }

        // Pass 2a: recharge confirmation with no debit marker is a
        // top-up notice, not a realized transaction.
        if self.recharge.is_match(body)
            && body.contains("success")
            && !self.debit_marker.is_match(body)
        {
            return Some(NoiseKind::NonTransactionIntent);
        }

        // Pass 2b: mandates, payment requests, approval prompts, IPO blocks
        if self.intent.is_match(body) {
            return Some(NoiseKind::NonTransactionIntent);
        }

        None
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(body: &str) -> Option<NoiseKind> {
        NoiseFilter::new().check(&body.to_lowercase())
    }

    #[test]
    fn test_pure_otp_rejected() {
        assert_eq!(check("Your OTP is 4455"), Some(NoiseKind::SecurityAlert));
        assert_eq!(
            check("Use verification code 998877 to login"),
            Some(NoiseKind::SecurityAlert)
        );
    }

    #[test]
    fn test_transaction_with_otp_footer_accepted() {
        // Real debit alerts often end with a security footer; the
        // conjunction in pass 1 must let these through.
        assert_eq!(
            check("Rs.500 debited from A/c XX1234. Never share your OTP with anyone."),
            None
        );
    }

    #[test]
    fn test_recharge_confirmation_rejected() {
        assert_eq!(
            check("Recharge of Rs.239 successful on your Jio number"),
            Some(NoiseKind::NonTransactionIntent)
        );
    }

    #[test]
    fn test_recharge_with_debit_marker_accepted() {
        assert_eq!(
            check("Rs.239 debited for recharge. Txn successful."),
            None
        );
    }

    #[test]
    fn test_mandate_and_requests_rejected() {
        assert_eq!(
            check("E-mandate set up for Rs.499 monthly towards NETFLIX"),
            Some(NoiseKind::NonTransactionIntent)
        );
        assert_eq!(
            check("John has requested money Rs.200 on UPI. Approve the request in your app."),
            Some(NoiseKind::NonTransactionIntent)
        );
        assert_eq!(
            check("Your AutoPay for DTH is active"),
            Some(NoiseKind::NonTransactionIntent)
        );
    }

    #[test]
    fn test_ipo_block_rejected() {
        assert_eq!(
            check("Rs.15000 blocked for IPO application via ASBA"),
            Some(NoiseKind::NonTransactionIntent)
        );
    }

    #[test]
    fn test_plain_transactions_pass() {
        assert_eq!(check("Rs.500 debited from A/c XX1234 on 12-Jan"), None);
        assert_eq!(
            check("INR 1200 credited to your account via UPI from john@upi"),
            None
        );
    }

    #[test]
    fn test_ipo_needs_word_boundary() {
        // "chipotle" contains the letters i-p-o; only the standalone token rejects
        assert_eq!(check("Rs.850 spent at CHIPOTLE via card"), None);
    }
}
