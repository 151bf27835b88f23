//! HTTP cache control module
//!
//! `ETag` generation and conditional-request matching for the static
//! asset path.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Generate a quoted `ETag` from content bytes using fast hashing.
#[must_use]
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check whether a client `If-None-Match` header matches the server `ETag`.
///
/// Handles single tags, comma-separated lists, and the `*` wildcard.
/// Returns true when the client copy is current (respond 304).
#[must_use]
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .any(|e| e.trim() == etag || e.trim() == "*")
    })
}
