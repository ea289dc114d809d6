//! Listing page scanning.
//!
//! A category's listing page links to its policy PDFs. Every `<a href>` whose
//! resolved path ends with the document extension and whose visible text is
//! non-empty becomes a [`ListingEntry`], in page order. Nothing is
//! de-duplicated; resolution takes the first match.

pub mod ident;

pub use ident::{identifier_from_title, strip_separators, title_matches};

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::fetch::{ACCEPT_HTML, Fetcher};
use desk_core::Error;

/// A document link found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    /// Best-effort identifier from the first token of the title.
    pub identifier: String,
    /// Absolute document URL.
    pub location: Url,
    /// Whitespace-collapsed link text.
    pub title: String,
}

/// Whether the URL path ends with `extension`, ignoring ASCII case.
pub fn has_extension(url: &Url, extension: &str) -> bool {
    url.path().to_ascii_lowercase().ends_with(&extension.to_ascii_lowercase())
}

/// Parse listing HTML into document entries, resolving links against `base_url`.
pub fn parse_listing(html: &str, base_url: &Url, extension: &str) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut entries = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Ok(location) = base_url.join(href.trim()) else {
            tracing::debug!(href, "skipping unresolvable listing link");
            continue;
        };

        if !has_extension(&location, extension) {
            continue;
        }

        // fragments are adjacent in the rendered text; only whitespace separates words
        let title = element
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if title.is_empty() {
            continue;
        }

        entries.push(ListingEntry { identifier: identifier_from_title(&title), location, title });
    }

    entries
}

/// Fetch a listing page and extract its document entries.
///
/// An empty page is an empty vector, not an error.
pub async fn scan_listing(fetcher: &dyn Fetcher, location: &Url, extension: &str) -> Result<Vec<ListingEntry>, Error> {
    let response = fetcher.fetch(location, ACCEPT_HTML).await?;
    let html = String::from_utf8_lossy(&response.bytes);
    let entries = parse_listing(&html, &response.final_url, extension);

    tracing::debug!(listing = %location, entries = entries.len(), fetch_ms = response.fetch_ms, "scanned listing");

    Ok(entries)
}

/// First entry in page order whose title matches `identifier`.
pub fn find_entry<'a>(entries: &'a [ListingEntry], identifier: &str) -> Option<&'a ListingEntry> {
    entries.iter().find(|entry| title_matches(&entry.title, identifier))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html>
            <body>
                <h1>Series 0000 - District Wide</h1>
                <a href="/District/index.html">Home</a>
                <ul>
                    <li>
                        <a href="/files/public_files/Policy-Library/0000/0001_Policy.pdf">0001, Diversity Policy</a>
                        <a href="/files/public_files/Policy-Library/0000/0001_Policy.pdf"><img src="pdf.png"></a>
                    </li>
                    <li><a href="../files/0010-Goals.PDF">
                        0010 - District
                        Goals
                    </a></li>
                    <li><a href="0020_Draft.docx">0020 Draft</a></li>
                    <li><a href="https://cdn.example.org/0030.pdf?v=2#page=1">0030, Mission</a></li>
                </ul>
            </body>
        </html>
    "#;

    fn base() -> Url {
        Url::parse("https://www.example.org/District/464-Series-0000.html").unwrap()
    }

    #[test]
    fn test_parse_listing_filters_and_resolves() {
        let entries = parse_listing(LISTING, &base(), ".pdf");

        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].identifier, "0001");
        assert_eq!(entries[0].title, "0001, Diversity Policy");
        assert_eq!(
            entries[0].location.as_str(),
            "https://www.example.org/files/public_files/Policy-Library/0000/0001_Policy.pdf"
        );

        assert_eq!(entries[1].identifier, "0010");
        assert_eq!(entries[1].title, "0010 - District Goals");
        assert_eq!(entries[1].location.as_str(), "https://www.example.org/files/0010-Goals.PDF");

        assert_eq!(entries[2].identifier, "0030");
        assert_eq!(entries[2].location.host_str(), Some("cdn.example.org"));
    }

    #[test]
    fn test_parse_listing_title_follows_rendered_text() {
        let html = r#"<a href="1105.pdf"><b>1105</b>-Board Meetings</a><a href="2210.pdf"><span>2210</span> <em>Field</em>
            Trips</a>"#;
        let entries = parse_listing(html, &base(), ".pdf");

        assert_eq!(entries[0].title, "1105-Board Meetings");
        assert_eq!(entries[0].identifier, "1105Board");
        assert_eq!(entries[1].title, "2210 Field Trips");
        assert_eq!(entries[1].identifier, "2210");
    }

    #[test]
    fn test_parse_listing_skips_empty_text() {
        let html = r#"<a href="a.pdf"></a><a href="b.pdf">   </a><a href="c.pdf"><img src="x.png"></a>"#;
        assert!(parse_listing(html, &base(), ".pdf").is_empty());
    }

    #[test]
    fn test_parse_listing_no_links() {
        let html = "<html><body><p>No policies yet</p></body></html>";
        assert!(parse_listing(html, &base(), ".pdf").is_empty());
    }

    #[test]
    fn test_parse_listing_keeps_duplicates_in_order() {
        let html = r#"<a href="x.pdf">0001 First</a><a href="y.pdf">0001 Second</a>"#;
        let entries = parse_listing(html, &base(), ".pdf");
        assert_eq!(entries.len(), 2);
        assert_eq!(find_entry(&entries, "0001").map(|e| e.title.as_str()), Some("0001 First"));
    }

    #[test]
    fn test_parse_listing_custom_extension() {
        let entries = parse_listing(LISTING, &base(), ".docx");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].identifier, "0020");
    }

    #[test]
    fn test_has_extension_ignores_query_and_case() {
        assert!(has_extension(&Url::parse("https://a.org/x.PDF?download=1").unwrap(), ".pdf"));
        assert!(!has_extension(&Url::parse("https://a.org/x.pdf.html").unwrap(), ".pdf"));
    }

    #[test]
    fn test_find_entry_by_identifier() {
        let entries = parse_listing(LISTING, &base(), ".pdf");
        let entry = find_entry(&entries, "0010").unwrap();
        assert!(entry.location.as_str().ends_with("0010-Goals.PDF"));
        assert!(find_entry(&entries, "9999").is_none());
    }
}
