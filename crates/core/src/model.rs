//! Shared domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `(category, identifier)` pair naming one policy document.
///
/// This is the cache key. Ordering is by category, then identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PolicyRef {
    pub category: String,
    pub identifier: String,
}

impl PolicyRef {
    pub fn new(category: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self { category: category.into(), identifier: identifier.into() }
    }

    /// Flat key combining both fields, e.g. `1000_1105`.
    pub fn cache_key(&self) -> String {
        format!("{}_{}", self.category, self.identifier)
    }
}

impl fmt::Display for PolicyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.identifier)
    }
}

/// Extracted text persisted for a reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CachedDocument {
    pub category: String,
    pub identifier: String,
    pub text: String,
    /// SHA-256 hex digest of `text`.
    pub content_hash: String,
    /// PDF location the text was extracted from.
    pub source_url: Option<String>,
    /// Listing display text at extraction time.
    pub title: Option<String>,
    pub page_count: Option<i64>,
    pub fetched_at: String,
}

impl CachedDocument {
    pub fn reference(&self) -> PolicyRef {
        PolicyRef::new(&self.category, &self.identifier)
    }
}

/// Where a returned text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TextSource {
    Cached,
    Live,
}

/// A single search match against the cached corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchHit {
    pub category: String,
    pub identifier: String,
    /// Plain excerpt starting at the first match.
    pub snippet: String,
    /// Excerpt with every match wrapped in `<mark>` and the rest HTML-escaped.
    pub highlighted_snippet: String,
}
