//! Policies deciding whether a cached document may still be served.
//!
//! The cache itself never expires anything. The resolution path asks the
//! configured policy on every hit; a rejected entry is treated as a miss and
//! refetched, which overwrites the row.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::CachedDocument;

/// Decides whether a cache hit is servable.
pub trait RetentionPolicy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether `doc` may be returned as-is at time `now`.
    fn is_servable(&self, doc: &CachedDocument, now: DateTime<Utc>) -> bool;
}

/// Serve cached text forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverExpire;

impl RetentionPolicy for NeverExpire {
    fn name(&self) -> &'static str {
        "never-expire"
    }

    fn is_servable(&self, _doc: &CachedDocument, _now: DateTime<Utc>) -> bool {
        true
    }
}

/// Serve cached text only while it is younger than `max_age`.
///
/// Rows with an unparseable `fetched_at` are treated as expired.
#[derive(Debug, Clone, Copy)]
pub struct MaxAge {
    max_age: Duration,
}

impl MaxAge {
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }
}

impl RetentionPolicy for MaxAge {
    fn name(&self) -> &'static str {
        "max-age"
    }

    fn is_servable(&self, doc: &CachedDocument, now: DateTime<Utc>) -> bool {
        let Ok(fetched_at) = DateTime::parse_from_rfc3339(&doc.fetched_at) else {
            return false;
        };
        match (now - fetched_at.with_timezone(&Utc)).to_std() {
            Ok(age) => age <= self.max_age,
            // fetched_at in the future (clock skew)
            Err(_) => true,
        }
    }
}
