//! Content hashing for cached text.

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of extracted text.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
