//! Core types and shared functionality for policy-desk.
//!
//! This crate provides:
//! - Category catalog (category key to listing page)
//! - Document cache with SQLite backend
//! - Substring search over the cached corpus
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod search;

pub use cache::{CacheDb, MaxAge, NeverExpire, RetentionPolicy};
pub use catalog::Catalog;
pub use config::{AppConfig, ConfigError, IndexMode};
pub use error::Error;
pub use model::{CachedDocument, PolicyRef, SearchHit, TextSource};
pub use search::{Index, SearchEngine, TermIndex};
