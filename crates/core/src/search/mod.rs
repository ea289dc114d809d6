//! Substring search over the cached corpus.
//!
//! Matching is case-insensitive containment against the full cached text.
//! Results are not ranked; they come back ordered by `(category, identifier)`.

pub mod index;
pub mod matcher;

pub use index::{Index, TermIndex};
pub use matcher::Matcher;

use tokio::sync::RwLock;

use crate::config::IndexMode;
use crate::{CacheDb, CachedDocument, Error, PolicyRef, SearchHit};
use matcher::{ELLIPSIS, excerpt};

/// Build a hit for `doc` if it contains the query.
pub fn match_document(doc: &CachedDocument, matcher: &Matcher, snippet_chars: usize) -> Option<SearchHit> {
    let first = matcher.find(&doc.text)?;

    let (plain, truncated) = excerpt(&doc.text, first.start, snippet_chars);
    let mut highlighted = matcher.highlight(&plain);
    let mut snippet = plain;
    if truncated {
        snippet.push_str(ELLIPSIS);
        highlighted.push_str(ELLIPSIS);
    }

    Some(SearchHit {
        category: doc.category.clone(),
        identifier: doc.identifier.clone(),
        snippet,
        highlighted_snippet: highlighted,
    })
}

/// Search a set of documents, returning hits sorted by reference.
pub fn search_documents(docs: &[CachedDocument], query: &str, snippet_chars: usize) -> Result<Vec<SearchHit>, Error> {
    let matcher = Matcher::new(query)?;
    let mut hits: Vec<SearchHit> = docs
        .iter()
        .filter_map(|doc| match_document(doc, &matcher, snippet_chars))
        .collect();
    hits.sort_by(|a, b| (&a.category, &a.identifier).cmp(&(&b.category, &b.identifier)));
    Ok(hits)
}

/// Query-time search over the document cache.
///
/// With `IndexMode::Scan` it keeps no state and reads the whole cache on each
/// query. With `IndexMode::Terms` it keeps an inverted index that must be
/// warmed from the cache at startup and told about every write; it assumes
/// this process is the only writer.
#[derive(Debug)]
pub struct SearchEngine {
    index: RwLock<Index>,
    snippet_chars: usize,
}

impl SearchEngine {
    pub fn new(mode: IndexMode, snippet_chars: usize) -> Self {
        Self { index: RwLock::new(Index::new(mode)), snippet_chars }
    }

    /// Load every cached document into the index.
    ///
    /// Returns the number of documents indexed (0 for `Scan`).
    pub async fn warm(&self, db: &CacheDb) -> Result<usize, Error> {
        let mut index = self.index.write().await;
        if matches!(*index, Index::Scan) {
            return Ok(0);
        }

        let docs = db.list_documents().await?;
        index.clear();
        for doc in &docs {
            index.add(&doc.reference(), &doc.text);
        }
        tracing::info!(documents = docs.len(), "search index warmed");
        Ok(docs.len())
    }

    /// Record a document that was just written to the cache.
    pub async fn record(&self, doc: &CachedDocument) {
        self.index.write().await.add(&doc.reference(), &doc.text);
    }

    pub async fn forget(&self, reference: &PolicyRef) {
        self.index.write().await.remove(reference);
    }

    pub async fn forget_category(&self, category: &str) {
        self.index.write().await.remove_category(category);
    }

    pub async fn forget_all(&self) {
        self.index.write().await.clear();
    }

    /// Search the cache for `query`.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyQuery` for blank input, or a storage error.
    pub async fn search(&self, db: &CacheDb, query: &str) -> Result<Vec<SearchHit>, Error> {
        let matcher = Matcher::new(query)?;

        let candidates = self.index.read().await.query(matcher.query());
        let docs = match candidates {
            None => db.list_documents().await?,
            Some(refs) if refs.is_empty() => Vec::new(),
            Some(refs) => db.get_documents(refs.into_iter().collect()).await?,
        };

        let hits: Vec<SearchHit> = docs
            .iter()
            .filter_map(|doc| match_document(doc, &matcher, self.snippet_chars))
            .collect();

        tracing::debug!(query = matcher.query(), scanned = docs.len(), hits = hits.len(), "searched cache");
        Ok(hits)
    }
}
