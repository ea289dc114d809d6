//! Resolution orchestration: cache, catalog, listing, extraction.
//!
//! `get_policy_text` is read-through: a cache hit never touches the network,
//! and a miss resolves the category, scans its listing, extracts the first
//! matching document and writes the text through to the cache. Nothing is
//! cached when any step fails.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::extract::{Extractor, extract_document};
use crate::fetch::Fetcher;
use crate::listing::{ListingEntry, find_entry, scan_listing, strip_separators};
use desk_core::config::IndexMode;
use desk_core::{
    CacheDb, CachedDocument, Catalog, Error, NeverExpire, PolicyRef, RetentionPolicy, SearchEngine, SearchHit,
    TextSource,
};

/// Text returned for a policy reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyText {
    pub category: String,
    pub identifier: String,
    pub source: TextSource,
    pub text: String,
    pub title: Option<String>,
    /// Original PDF location, when known.
    pub source_url: Option<String>,
    pub fetched_at: String,
    pub page_count: Option<i64>,
}

impl PolicyText {
    fn from_document(doc: CachedDocument, source: TextSource) -> Self {
        Self {
            category: doc.category,
            identifier: doc.identifier,
            source,
            text: doc.text,
            title: doc.title,
            source_url: doc.source_url,
            fetched_at: doc.fetched_at,
            page_count: doc.page_count,
        }
    }
}

/// Documents currently linked from a category's listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryListing {
    pub category: String,
    pub location: Url,
    pub entries: Vec<ListingEntry>,
}

/// What a manual cache purge removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeScope {
    Reference(PolicyRef),
    Category(String),
    All,
}

/// The policy pipeline behind every front end.
pub struct PolicyService {
    db: CacheDb,
    catalog: Catalog,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    retention: Box<dyn RetentionPolicy>,
    search: SearchEngine,
    extension: String,
}

impl PolicyService {
    /// Create a service with the default policies: never-expiring cache,
    /// scan search with 200-char snippets, `.pdf` links.
    pub fn new(db: CacheDb, catalog: Catalog, fetcher: Arc<dyn Fetcher>, extractor: Arc<dyn Extractor>) -> Self {
        Self {
            db,
            catalog,
            fetcher,
            extractor,
            retention: Box::new(NeverExpire),
            search: SearchEngine::new(IndexMode::Scan, 200),
            extension: ".pdf".to_string(),
        }
    }

    pub fn with_retention(mut self, retention: Box<dyn RetentionPolicy>) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_search(mut self, search: SearchEngine) -> Self {
        self.search = search;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Configured categories and their listing pages, in key order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &Url)> {
        self.catalog.categories()
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    /// Prepare the search index from what is already cached.
    pub async fn warm_search(&self) -> Result<usize, Error> {
        self.search.warm(&self.db).await
    }

    /// Text for `(category, identifier)`, from cache when present.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a blank identifier
    /// - `UnknownCategory` when the category is not in the catalog
    /// - `UnresolvedDocument` when no listing entry matches
    /// - `Fetch*`, `Format`, `EmptyDocument` from scanning or extraction
    /// - `Database` when the cache cannot be read or written
    pub async fn get_policy_text(&self, category: &str, identifier: &str) -> Result<PolicyText, Error> {
        let identifier = identifier.trim();
        if strip_separators(identifier).trim().is_empty() {
            return Err(Error::InvalidInput("identifier cannot be empty".into()));
        }

        let reference = PolicyRef::new(category, identifier);

        if let Some(doc) = self.db.get_document(&reference).await? {
            if self.retention.is_servable(&doc, Utc::now()) {
                tracing::debug!(reference = %reference, "cache hit");
                return Ok(PolicyText::from_document(doc, TextSource::Cached));
            }
            tracing::debug!(
                reference = %reference,
                policy = self.retention.name(),
                fetched_at = %doc.fetched_at,
                "cached entry not servable, refetching"
            );
        }

        let listing = self.catalog.resolve_category(category)?;
        let entries = scan_listing(self.fetcher.as_ref(), listing, &self.extension).await?;

        let Some(entry) = find_entry(&entries, identifier) else {
            tracing::debug!(reference = %reference, scanned = entries.len(), "no listing entry matched");
            return Err(Error::UnresolvedDocument {
                category: category.to_string(),
                identifier: identifier.to_string(),
            });
        };

        let extracted = extract_document(self.fetcher.as_ref(), Arc::clone(&self.extractor), &entry.location).await?;

        let doc = CachedDocument::new(
            &reference,
            extracted.text,
            Some(entry.location.to_string()),
            Some(entry.title.clone()),
            Some(extracted.page_count as i64),
        );
        self.db.put_document(&doc).await?;
        self.search.record(&doc).await;

        tracing::info!(
            reference = %reference,
            location = %entry.location,
            pages = extracted.page_count,
            "cached live extraction"
        );

        Ok(PolicyText::from_document(doc, TextSource::Live))
    }

    /// Documents linked from the category's listing page, in page order.
    pub async fn list_category_documents(&self, category: &str) -> Result<CategoryListing, Error> {
        let location = self.catalog.resolve_category(category)?;
        let entries = scan_listing(self.fetcher.as_ref(), location, &self.extension).await?;
        Ok(CategoryListing { category: category.to_string(), location: location.clone(), entries })
    }

    /// Case-insensitive substring search over the cache.
    pub async fn search_cache(&self, query: &str) -> Result<Vec<SearchHit>, Error> {
        self.search.search(&self.db, query).await
    }

    /// Manually clear cached text. Returns the number of removed entries.
    pub async fn purge(&self, scope: PurgeScope) -> Result<u64, Error> {
        let deleted = match &scope {
            PurgeScope::Reference(reference) => {
                let deleted = u64::from(self.db.delete_document(reference).await?);
                self.search.forget(reference).await;
                deleted
            }
            PurgeScope::Category(category) => {
                let deleted = self.db.purge_category(category).await?;
                self.search.forget_category(category).await;
                deleted
            }
            PurgeScope::All => {
                let deleted = self.db.purge_all().await?;
                self.search.forget_all().await;
                deleted
            }
        };

        tracing::info!(?scope, deleted, "purged cache");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractedText;
    use crate::fetch::FetchResponse;
    use async_trait::async_trait;
    use bytes::Bytes;
    use desk_core::{AppConfig, MaxAge};
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    const SERIES_0000: &str = "https://www.asd103.org/District/464-Series-0000---District-Wide.html";

    /// Serves canned bodies by URL and records every request.
    #[derive(Default)]
    struct StubFetcher {
        bodies: Mutex<HashMap<String, Vec<u8>>>,
        calls: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn serve(&self, url: &str, body: impl Into<Vec<u8>>) {
            self.bodies.lock().unwrap().insert(url.to_string(), body.into());
        }

        fn calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, url: &Url, _accept: &str) -> Result<FetchResponse, Error> {
            self.calls.lock().unwrap().push(url.to_string());
            let body = self.bodies.lock().unwrap().get(url.as_str()).cloned();
            match body {
                Some(body) => Ok(FetchResponse {
                    url: url.clone(),
                    final_url: url.clone(),
                    status: StatusCode::OK,
                    content_type: None,
                    bytes: Bytes::from(body),
                    fetch_ms: 1,
                }),
                None => Err(Error::Fetch(format!("{url}: status 404"))),
            }
        }
    }

    /// Treats `%PDF-` followed by form-feed separated pages as a document.
    struct StubExtractor;

    impl Extractor for StubExtractor {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn extract(&self, bytes: &[u8], source: &str) -> Result<ExtractedText, Error> {
            let body = std::str::from_utf8(bytes).map_err(|e| Error::Format(e.to_string()))?;
            let Some(rest) = body.strip_prefix("%PDF-") else {
                return Err(Error::Format(format!("{source}: not a PDF")));
            };
            let pages = if rest.is_empty() { Vec::new() } else { rest.split('\x0c').map(str::to_string).collect() };
            ExtractedText::from_pages(pages, source)
        }
    }

    fn listing_html(links: &[(&str, &str)]) -> String {
        let items: String = links
            .iter()
            .map(|(href, text)| format!("<li><a href=\"{href}\">{text}</a></li>"))
            .collect();
        format!("<html><body><ul>{items}</ul></body></html>")
    }

    async fn service(fetcher: Arc<StubFetcher>) -> PolicyService {
        let db = CacheDb::open_in_memory().await.unwrap();
        let catalog = Catalog::from_config(&AppConfig::default()).unwrap();
        PolicyService::new(db, catalog, fetcher, Arc::new(StubExtractor))
    }

    fn diversity_fixture() -> Arc<StubFetcher> {
        let fetcher = Arc::new(StubFetcher::default());
        fetcher.serve(
            SERIES_0000,
            listing_html(&[
                ("/files/0000/0001_Policy.pdf", "0001, Diversity Policy"),
                ("/files/0000/0002_Policy.pdf", "0002 - Equity Statement"),
            ]),
        );
        fetcher.serve(
            "https://www.asd103.org/files/0000/0001_Policy.pdf",
            "%PDF-Diversity, Equity and Inclusion\x0cAll Staff shall participate.",
        );
        fetcher
    }

    #[tokio::test]
    async fn test_resolve_then_serve_from_cache() {
        let fetcher = diversity_fixture();
        let service = service(fetcher.clone()).await;

        let live = service.get_policy_text("0000", "0001").await.unwrap();
        assert_eq!(live.source, TextSource::Live);
        assert_eq!(live.text, "Diversity, Equity and Inclusion\nAll Staff shall participate.");
        assert_eq!(live.title.as_deref(), Some("0001, Diversity Policy"));
        assert_eq!(live.source_url.as_deref(), Some("https://www.asd103.org/files/0000/0001_Policy.pdf"));
        assert_eq!(live.page_count, Some(2));
        assert_eq!(fetcher.calls(), 2);

        let cached = service.get_policy_text("0000", "0001").await.unwrap();
        assert_eq!(cached.source, TextSource::Cached);
        assert_eq!(cached.text, live.text);
        assert_eq!(cached.source_url, live.source_url);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_category() {
        let fetcher = diversity_fixture();
        let service = service(fetcher.clone()).await;

        let result = service.get_policy_text("9000", "0001").await;
        assert!(matches!(result, Err(Error::UnknownCategory(k)) if k == "9000"));
        assert_eq!(fetcher.calls(), 0);

        let result = service.list_category_documents("9000").await;
        assert!(matches!(result, Err(Error::UnknownCategory(_))));
    }

    #[tokio::test]
    async fn test_blank_identifier_rejected() {
        let fetcher = diversity_fixture();
        let service = service(fetcher.clone()).await;

        for identifier in ["", "   ", "-", " , "] {
            let result = service.get_policy_text("0000", identifier).await;
            assert!(matches!(result, Err(Error::InvalidInput(_))), "identifier {identifier:?}");
        }
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_unresolved_document_not_cached() {
        let fetcher = diversity_fixture();
        let service = service(fetcher.clone()).await;

        let result = service.get_policy_text("0000", "0099").await;
        assert!(matches!(
            result,
            Err(Error::UnresolvedDocument { category, identifier }) if category == "0000" && identifier == "0099"
        ));
        assert_eq!(service.db().count_documents().await.unwrap(), 0);

        // a miss is recomputed every time, never remembered
        let _ = service.get_policy_text("0000", "0099").await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_format_error_propagates_and_caches_nothing() {
        let fetcher = diversity_fixture();
        fetcher.serve("https://www.asd103.org/files/0000/0002_Policy.pdf", "<html>Moved</html>");
        let service = service(fetcher).await;

        let result = service.get_policy_text("0000", "0002").await;
        assert!(matches!(result, Err(Error::Format(_))));
        assert!(service.db().get_document(&PolicyRef::new("0000", "0002")).await.unwrap().is_none());
        assert!(service.search_cache("moved").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_document_is_distinct_and_not_cached() {
        let fetcher = diversity_fixture();
        fetcher.serve("https://www.asd103.org/files/0000/0002_Policy.pdf", "%PDF- \x0c\n");
        let service = service(fetcher).await;

        let result = service.get_policy_text("0000", "0002").await;
        assert!(matches!(result, Err(Error::EmptyDocument(_))));
        assert_eq!(service.db().count_documents().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_document_fetch_failure_is_transient() {
        let fetcher = diversity_fixture();
        let service = service(fetcher).await;

        // 0002 is listed but its PDF is not served
        let err = service.get_policy_text("0000", "0002").await.unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
        assert!(err.is_transient());
        assert_eq!(service.db().count_documents().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_listing_unreachable() {
        let fetcher = Arc::new(StubFetcher::default());
        let service = service(fetcher).await;

        let result = service.get_policy_text("0000", "0001").await;
        assert!(matches!(result, Err(Error::Fetch(_))));

        let result = service.list_category_documents("0000").await;
        assert!(matches!(result, Err(Error::Fetch(_))));
    }

    #[tokio::test]
    async fn test_first_matching_entry_wins() {
        let fetcher = Arc::new(StubFetcher::default());
        fetcher.serve(
            SERIES_0000,
            listing_html(&[
                ("/a/10001.pdf", "10001 Archived Policy"),
                ("/a/0001.pdf", "0001, Diversity Policy"),
            ]),
        );
        fetcher.serve("https://www.asd103.org/a/10001.pdf", "%PDF-archived");
        fetcher.serve("https://www.asd103.org/a/0001.pdf", "%PDF-current");
        let service = service(fetcher).await;

        let text = service.get_policy_text("0000", "0001").await.unwrap();
        assert_eq!(text.text, "archived");
    }

    #[tokio::test]
    async fn test_cached_text_survives_upstream_changes() {
        let fetcher = diversity_fixture();
        let service = service(fetcher.clone()).await;

        let first = service.get_policy_text("0000", "0001").await.unwrap();

        fetcher.serve(SERIES_0000, listing_html(&[("/files/0000/0001_v2.pdf", "0001, Diversity Policy (revised)")]));
        fetcher.serve("https://www.asd103.org/files/0000/0001_v2.pdf", "%PDF-Revised text");
        let calls_before = fetcher.calls();

        let again = service.get_policy_text("0000", "0001").await.unwrap();
        assert_eq!(again.source, TextSource::Cached);
        assert_eq!(again.text, first.text);
        assert_eq!(again.source_url, first.source_url);
        assert_eq!(fetcher.calls(), calls_before);
    }

    #[tokio::test]
    async fn test_max_age_policy_refetches_old_entries() {
        let fetcher = diversity_fixture();
        let service = service(fetcher.clone())
            .await
            .with_retention(Box::new(MaxAge::new(Duration::from_secs(3600))));

        let mut stale = CachedDocument::new(&PolicyRef::new("0000", "0001"), "old text".into(), None, None, None);
        stale.fetched_at = "2001-01-01T00:00:00+00:00".into();
        service.db().put_document(&stale).await.unwrap();

        let text = service.get_policy_text("0000", "0001").await.unwrap();
        assert_eq!(text.source, TextSource::Live);
        assert!(text.text.starts_with("Diversity"));

        let text = service.get_policy_text("0000", "0001").await.unwrap();
        assert_eq!(text.source, TextSource::Cached);
    }

    #[tokio::test]
    async fn test_default_policy_serves_old_entries() {
        let fetcher = diversity_fixture();
        let service = service(fetcher.clone()).await;

        let mut old = CachedDocument::new(&PolicyRef::new("0000", "0001"), "old text".into(), None, None, None);
        old.fetched_at = "2001-01-01T00:00:00+00:00".into();
        service.db().put_document(&old).await.unwrap();

        let text = service.get_policy_text("0000", "0001").await.unwrap();
        assert_eq!(text.source, TextSource::Cached);
        assert_eq!(text.text, "old text");
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_categories_follow_catalog() {
        let service = service(Arc::new(StubFetcher::default())).await;
        let keys: Vec<&str> = service.categories().map(|(key, _)| key).collect();
        assert_eq!(keys.len(), 7);
        assert_eq!(keys.first(), Some(&"0000"));
        assert_eq!(keys.last(), Some(&"6000"));
    }

    #[tokio::test]
    async fn test_list_category_documents() {
        let fetcher = diversity_fixture();
        let service = service(fetcher).await;

        let listing = service.list_category_documents("0000").await.unwrap();
        assert_eq!(listing.category, "0000");
        assert_eq!(listing.location.as_str(), SERIES_0000);
        let ids: Vec<&str> = listing.entries.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, vec!["0001", "0002"]);
        assert_eq!(listing.entries[1].title, "0002 - Equity Statement");
    }

    #[tokio::test]
    async fn test_search_after_resolution() {
        let fetcher = diversity_fixture();
        let service = service(fetcher).await;

        assert!(matches!(service.search_cache("").await, Err(Error::EmptyQuery)));
        assert!(matches!(service.search_cache("   ").await, Err(Error::EmptyQuery)));
        assert!(service.search_cache("staff").await.unwrap().is_empty());

        service.get_policy_text("0000", "0001").await.unwrap();

        let hits = service.search_cache("staff").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category, "0000");
        assert_eq!(hits[0].identifier, "0001");
        assert_eq!(hits[0].highlighted_snippet, "<mark>Staff</mark> shall participate.");
    }

    #[tokio::test]
    async fn test_terms_index_sees_live_extractions() {
        let fetcher = diversity_fixture();
        let service = service(fetcher)
            .await
            .with_search(SearchEngine::new(IndexMode::Terms, 200));
        assert_eq!(service.warm_search().await.unwrap(), 0);

        service.get_policy_text("0000", "0001").await.unwrap();
        let hits = service.search_cache("inclusion").await.unwrap();
        assert_eq!(hits.len(), 1);

        assert_eq!(service.purge(PurgeScope::All).await.unwrap(), 1);
        assert!(service.search_cache("inclusion").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purge_then_refetch() {
        let fetcher = diversity_fixture();
        let service = service(fetcher).await;

        service.get_policy_text("0000", "0001").await.unwrap();
        let reference = PolicyRef::new("0000", "0001");

        assert_eq!(service.purge(PurgeScope::Reference(reference.clone())).await.unwrap(), 1);
        assert_eq!(service.purge(PurgeScope::Reference(reference)).await.unwrap(), 0);

        let text = service.get_policy_text("0000", "0001").await.unwrap();
        assert_eq!(text.source, TextSource::Live);

        assert_eq!(service.purge(PurgeScope::Category("1000".into())).await.unwrap(), 0);
        assert_eq!(service.purge(PurgeScope::Category("0000".into())).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_policy_text_serializes_source() {
        let fetcher = diversity_fixture();
        let service = service(fetcher).await;

        let text = service.get_policy_text("0000", "0001").await.unwrap();
        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json["source"], "live");
        assert_eq!(json["identifier"], "0001");
    }
}
