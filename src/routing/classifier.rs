//! Request classification module
//!
//! Pure predicates over a normalized request deciding whether it is
//! well-formed and which serving path owns it. The dispatcher evaluates
//! them in priority order: static, then debug, then fragment, then page.

use crate::http::Request;

/// Reserved prefix for per-app static assets.
pub const STATIC_PREFIX: &str = "/public/";
/// Reserved prefix for debug introspection endpoints.
pub const DEBUG_PREFIX: &str = "/debug/";
/// Reserved prefix for fragment invocation.
pub const FRAGMENTS_PREFIX: &str = "/fragments/";

/// Whether the request URI is well-formed: absolute, cleanly
/// percent-encoded, and free of dot-segments and doubled slashes.
#[must_use]
pub fn is_valid(request: &Request) -> bool {
    let path = &request.path;
    if path.is_empty() || !path.starts_with('/') {
        return false;
    }
    if !decodes_cleanly(path) {
        return false;
    }
    let segments: Vec<&str> = path[1..].split('/').collect();
    for (index, segment) in segments.iter().enumerate() {
        if *segment == "." || *segment == ".." {
            return false;
        }
        // Only a trailing slash may produce an empty segment
        if segment.is_empty() && index + 1 != segments.len() {
            return false;
        }
    }
    true
}

/// Whether the request targets the app's static-asset space.
#[must_use]
pub fn is_static_resource_request(request: &Request) -> bool {
    request.path_without_context.starts_with(STATIC_PREFIX)
}

/// Whether the request targets the debug introspection space.
#[must_use]
pub fn is_debug_request(request: &Request) -> bool {
    request.path_without_context.starts_with(DEBUG_PREFIX)
}

/// Whether the request invokes a fragment.
#[must_use]
pub fn is_fragment_request(request: &Request) -> bool {
    request.path_without_context.starts_with(FRAGMENTS_PREFIX)
}

/// Check that every `%` escape is followed by two hex digits.
fn decodes_cleanly(path: &str) -> bool {
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let Some(pair) = bytes.get(i + 1..i + 3) else {
                return false;
            };
            if !pair.iter().all(u8::is_ascii_hexdigit) {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
