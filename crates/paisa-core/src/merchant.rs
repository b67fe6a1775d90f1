//! Merchant-key normalization
//!
//! The normalized key is the lookup key into the merchant-rule table. It must
//! be produced identically at rule write time (user confirms a category) and
//! at extraction read time, or lookups silently miss.

/// Canonicalize a free-text merchant name into a stable lookup key
///
/// Uppercase, strip every character outside `[A-Z0-9 ]`, collapse whitespace
/// runs to a single space, trim. Idempotent.
pub fn normalize_key(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for c in raw.to_uppercase().chars() {
        if c.is_ascii_uppercase() || c.is_ascii_digit() || c == ' ' {
            cleaned.push(c);
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
