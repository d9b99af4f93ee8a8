//! Shared text normalization for titles and release dates.
//! Used by the classifier and the catalog queries.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// PATTERNS
// ============================================================================

/// Characters seen in source titles standing in for a plain apostrophe.
pub const APOSTROPHE_VARIANTS: [char; 6] = [
    '\u{2018}', // left single quotation mark
    '\u{2019}', // right single quotation mark (typographic apostrophe)
    '\u{02BC}', // modifier letter apostrophe
    '\u{00B4}', // acute accent
    '\u{0060}', // grave accent
    '\u{FF07}', // fullwidth apostrophe
];

/// Leading four ASCII digits of a `YYYY[-MM[-DD]]` date.
pub static YEAR_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]{4})").unwrap());

// ============================================================================
// NORMALIZATION FUNCTIONS
// ============================================================================

/// Fold apostrophe variants to `'` and apply NFKC composition.
/// e.g., "Fearless (Taylor’s Version)" → "Fearless (Taylor's Version)"
///
/// Folding runs first: NFKC decomposes the acute accent into a space plus a
/// combining mark, which would no longer match.
pub fn normalize_apostrophes(s: &str) -> String {
    let folded = s.replace(APOSTROPHE_VARIANTS, "'");
    folded.as_str().nfkc().collect()
}

/// Extract the release year from a date string.
/// Returns None for empty input or when the first four characters are not
/// all ASCII digits.
pub fn release_year(date: &str) -> Option<i32> {
    let caps = YEAR_PREFIX.captures(date)?;
    caps.get(1)?.as_str().parse().ok()
}

// ============================================================================
// TESTS
// ============================================================================
