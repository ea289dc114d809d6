//! Policy identifiers derived from listing link text.
//!
//! Upstream titles look like `"0001, Diversity Policy"` or `"1105-Board Meetings"`,
//! but nothing enforces that. Everything here is best-effort and never fails:
//!
//! - Separators are stripped from tokens: ASCII `-` and `,`, Unicode dashes
//!   (U+2010..=U+2015, U+2212, U+FE58, U+FE63, U+FF0D) and full-width or
//!   ideographic commas (U+FF0C, U+3001).
//! - A title whose first token is only separators (`"- Draft"`) falls back to
//!   the first later token that survives stripping.
//! - A title made only of separators yields the empty identifier.
//! - Identifiers are not guaranteed unique within a listing.

/// Whether `c` is dropped when normalizing identifiers.
pub fn is_separator(c: char) -> bool {
    matches!(
        c,
        '-' | ',' | '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{FE58}' | '\u{FE63}' | '\u{FF0D}' | '\u{FF0C}' | '\u{3001}'
    )
}

/// Remove every separator character from `s`.
pub fn strip_separators(s: &str) -> String {
    s.chars().filter(|c| !is_separator(*c)).collect()
}

/// Identifier for a listing entry, taken from its display title.
pub fn identifier_from_title(title: &str) -> String {
    title
        .split_whitespace()
        .map(strip_separators)
        .find(|token| !token.is_empty())
        .unwrap_or_default()
}

/// Whether a listing title refers to the requested identifier.
///
/// Both sides are stripped of separators and compared as an ordered
/// substring, so `"0001"` matches `"0001, Diversity Policy"` and also
/// `"10001 Other"`. Callers take the first matching entry.
pub fn title_matches(title: &str, identifier: &str) -> bool {
    let wanted = strip_separators(identifier.trim());
    if wanted.is_empty() {
        return false;
    }
    strip_separators(title).contains(&wanted)
}
