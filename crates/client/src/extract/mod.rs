//! Document text extraction.
//!
//! ### Stable Abstraction
//! - Uses the `Extractor` trait so resolution code does not depend on the PDF engine.
//!
//! ### Failure Classification
//! - `Error::Fetch` / `Error::FetchTimeout` / `Error::FetchTooLarge`: transport.
//! - `Error::Format`: bytes are not a parseable document.
//! - `Error::EmptyDocument`: parsed, but no page yielded text.

pub mod pdf;

pub use pdf::PdfExtractor;

use std::sync::Arc;

use url::Url;

use crate::fetch::{ACCEPT_PDF, Fetcher};
use desk_core::Error;

/// Text extracted from a paginated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Page texts joined with `\n`, in page order.
    pub text: String,
    pub page_count: usize,
}

impl ExtractedText {
    /// Join per-page text in order.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyDocument` when there are no pages or every page is blank.
    pub fn from_pages(pages: Vec<String>, source: &str) -> Result<Self, Error> {
        if pages.is_empty() {
            return Err(Error::EmptyDocument(format!("{source}: document has no pages")));
        }
        if pages.iter().all(|page| page.trim().is_empty()) {
            return Err(Error::EmptyDocument(format!("{source}: no extractable text on {} pages", pages.len())));
        }

        let page_count = pages.len();
        Ok(Self { text: pages.join("\n"), page_count })
    }
}

/// Stable extractor trait for document bytes.
///
/// Implementations are CPU-bound and are run on a blocking thread.
pub trait Extractor: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &'static str;

    /// Extract text from raw document bytes. `source` is used in error messages only.
    fn extract(&self, bytes: &[u8], source: &str) -> Result<ExtractedText, Error>;
}

/// Fetch a document and extract its text.
pub async fn extract_document(
    fetcher: &dyn Fetcher, extractor: Arc<dyn Extractor>, location: &Url,
) -> Result<ExtractedText, Error> {
    let response = fetcher.fetch(location, ACCEPT_PDF).await?;
    let source = response.final_url.to_string();
    let bytes = response.bytes;

    let engine = extractor.name();
    let started = std::time::Instant::now();
    let extracted = tokio::task::spawn_blocking(move || extractor.extract(&bytes, &source))
        .await
        .map_err(|e| Error::Format(format!("{location}: extraction task failed: {e}")))??;

    tracing::debug!(
        document = %location,
        engine,
        pages = extracted.page_count,
        chars = extracted.text.len(),
        extract_ms = started.elapsed().as_millis() as u64,
        "extracted document"
    );

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchResponse;
    use async_trait::async_trait;
    use bytes::Bytes;
    use reqwest::StatusCode;

    struct OneDocument(&'static [u8]);

    #[async_trait]
    impl Fetcher for OneDocument {
        async fn fetch(&self, url: &Url, _accept: &str) -> Result<FetchResponse, Error> {
            Ok(FetchResponse {
                url: url.clone(),
                final_url: url.clone(),
                status: StatusCode::OK,
                content_type: Some("application/pdf".into()),
                bytes: Bytes::from_static(self.0),
                fetch_ms: 1,
            })
        }
    }

    #[tokio::test]
    async fn test_extract_document_with_pdf_engine() {
        let fetcher = OneDocument(include_bytes!("testdata/two_pages.pdf"));
        let location = Url::parse("https://www.example.org/files/0001_Policy.pdf").unwrap();

        let extracted = extract_document(&fetcher, Arc::new(PdfExtractor::new()), &location).await.unwrap();
        assert_eq!(extracted.page_count, 2);
        assert!(extracted.text.contains("Staff"));
    }

    #[tokio::test]
    async fn test_extract_document_rejects_html() {
        let fetcher = OneDocument(b"<html><body>Moved</body></html>");
        let location = Url::parse("https://www.example.org/files/0001_Policy.pdf").unwrap();

        let result = extract_document(&fetcher, Arc::new(PdfExtractor::new()), &location).await;
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_from_pages_joins_in_order() {
        let text = ExtractedText::from_pages(vec!["first".into(), "second".into(), "third".into()], "a.pdf").unwrap();
        assert_eq!(text.text, "first\nsecond\nthird");
        assert_eq!(text.page_count, 3);
    }

    #[test]
    fn test_from_pages_keeps_blank_pages_between_text() {
        let text = ExtractedText::from_pages(vec!["cover".into(), "  ".into(), "body".into()], "a.pdf").unwrap();
        assert_eq!(text.text, "cover\n  \nbody");
        assert_eq!(text.page_count, 3);
    }

    #[test]
    fn test_from_pages_no_pages() {
        let result = ExtractedText::from_pages(Vec::new(), "a.pdf");
        assert!(matches!(result, Err(Error::EmptyDocument(_))));
    }

    #[test]
    fn test_from_pages_all_blank() {
        let result = ExtractedText::from_pages(vec!["".into(), " \n\t".into()], "scan.pdf");
        assert!(matches!(result, Err(Error::EmptyDocument(msg)) if msg.contains("scan.pdf")));
    }
}
