//! SQLite-backed cache for extracted policy text.
//!
//! This module provides a persistent cache keyed by `(category, identifier)`
//! using SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Read-through lookup and write-through insert
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Manual clearing by reference, category, or everything
//!
//! Entries never expire on their own; whether a stored entry may be served is
//! decided by a [`RetentionPolicy`], which defaults to [`NeverExpire`].

pub mod connection;
pub mod documents;
pub mod hash;
pub mod migrations;
pub mod retention;

pub use crate::Error;

pub use connection::CacheDb;
pub use retention::{MaxAge, NeverExpire, RetentionPolicy};
