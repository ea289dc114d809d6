//! Case-insensitive matching, snippets and highlighting.
//!
//! A query is compiled once into an escaped, case-insensitive regex. Match
//! ranges are byte offsets into the searched text itself, so snippets and
//! marks never need to map positions back from a lowercased copy.

use std::ops::Range;

use regex::{Regex, RegexBuilder};

use crate::Error;

/// Marker appended to a snippet cut short of the end of the text.
pub const ELLIPSIS: &str = "...";

/// A compiled search query.
#[derive(Debug, Clone)]
pub struct Matcher {
    query: String,
    pattern: Regex,
}

impl Matcher {
    /// Compile `query` as a literal, case-insensitive pattern.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyQuery` for empty or whitespace-only input.
    pub fn new(query: &str) -> Result<Self, Error> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyQuery);
        }

        let pattern = RegexBuilder::new(&regex::escape(trimmed))
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::InvalidInput(format!("query cannot be compiled: {e}")))?;

        Ok(Self { query: trimmed.to_string(), pattern })
    }

    /// The trimmed query as given.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Byte range of the first occurrence in `text`.
    pub fn find(&self, text: &str) -> Option<Range<usize>> {
        self.pattern.find(text).map(|m| m.range())
    }

    /// Byte ranges of every non-overlapping occurrence in `text`.
    pub fn find_all(&self, text: &str) -> Vec<Range<usize>> {
        self.pattern.find_iter(text).map(|m| m.range()).collect()
    }

    /// Wrap every occurrence in `excerpt` in `<mark>` tags.
    ///
    /// Text outside the marks is HTML-escaped; the matched text keeps its
    /// original casing.
    pub fn highlight(&self, excerpt: &str) -> String {
        let mut out = String::with_capacity(excerpt.len() + 16);
        let mut last = 0;

        for range in self.find_all(excerpt) {
            escape_into(&mut out, &excerpt[last..range.start]);
            out.push_str("<mark>");
            escape_into(&mut out, &excerpt[range.clone()]);
            out.push_str("</mark>");
            last = range.end;
        }
        escape_into(&mut out, &excerpt[last..]);
        out
    }
}

/// Excerpt of at most `max_chars` characters starting at byte `start`.
///
/// Carriage returns and newlines become spaces. The returned flag is true
/// when text remains after the excerpt.
pub fn excerpt(text: &str, start: usize, max_chars: usize) -> (String, bool) {
    let mut chars = text[start..].chars();
    let excerpt: String = chars
        .by_ref()
        .take(max_chars)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let truncated = chars.next().is_some();
    (excerpt, truncated)
}

fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
