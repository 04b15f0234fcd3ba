//! Text folding helpers shared by matching, ranking, and cache keys.
//!
//! Vietnamese display names arrive in mixed Unicode forms (composed and
//! decomposed diacritics), so every comparison in the pipeline goes through
//! NFC normalization before case folding. Matching stays substring-based;
//! diacritics are preserved, not stripped.

use unicode_normalization::{UnicodeNormalization, is_nfc};

/// Normalize text for comparison: NFC composition followed by lowercasing.
#[must_use]
pub fn fold(text: &str) -> String {
    if is_nfc(text) {
        text.to_lowercase()
    } else {
        text.nfc().collect::<String>().to_lowercase()
    }
}

/// Canonical key for cache and analytics entries: trimmed, then folded.
#[must_use]
pub fn normalize_query(query: &str) -> String {
    fold(query.trim())
}

/// Whether a query is empty or whitespace-only.
#[must_use]
pub fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}

/// Case-insensitive substring test; the needle must already be folded.
#[must_use]
pub fn contains_fold(haystack: &str, folded_needle: &str) -> bool {
    fold(haystack).contains(folded_needle)
}

/// Case-insensitive prefix test; the needle must already be folded.
#[must_use]
pub fn starts_with_fold(haystack: &str, folded_needle: &str) -> bool {
    fold(haystack).starts_with(folded_needle)
}

/// Case-insensitive equality; the needle must already be folded.
#[must_use]
pub fn eq_fold(haystack: &str, folded_needle: &str) -> bool {
    fold(haystack) == folded_needle
}
