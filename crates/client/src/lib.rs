//! Upstream access for policy-desk.
//!
//! This crate provides the HTTP fetch pipeline, listing page scanning, PDF
//! text extraction, and the [`PolicyService`] that ties them to the cache.

pub mod extract;
pub mod fetch;
pub mod listing;
pub mod service;

pub use extract::{ExtractedText, Extractor, PdfExtractor, extract_document};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, Fetcher};
pub use listing::{ListingEntry, find_entry, parse_listing, scan_listing};
pub use service::{CategoryListing, PolicyService, PolicyText, PurgeScope};
