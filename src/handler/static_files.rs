//! Static asset serving module
//!
//! Resolves requests under an app's static-asset space to files on disk,
//! with path-traversal protection, `ETag` revalidation, and MIME type
//! detection.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs;

use crate::app::App;
use crate::http::{cache, mime, Request, ResponseDescriptor};
use crate::logger;
use crate::routing::classifier::STATIC_PREFIX;

/// Resolves a static-asset request for an app into a response.
#[async_trait]
pub trait StaticResolver: Send + Sync {
    async fn resolve(&self, app: &App, request: &Request) -> ResponseDescriptor;
}

/// Disk-backed resolver reading from the app's static directory.
pub struct DiskStaticResolver;

#[async_trait]
impl StaticResolver for DiskStaticResolver {
    async fn resolve(&self, app: &App, request: &Request) -> ResponseDescriptor {
        let Some(static_dir) = app.static_dir() else {
            return not_found();
        };
        let relative = request
            .path_without_context
            .strip_prefix(STATIC_PREFIX)
            .unwrap_or(&request.path_without_context);

        match load_asset(static_dir, relative).await {
            Some(content) => {
                let etag = cache::generate_etag(&content);
                if cache::check_etag_match(request.header("if-none-match"), &etag) {
                    let mut response = ResponseDescriptor::status_only(304);
                    response.add_header("ETag", &etag);
                    response.add_header("Cache-Control", "public, max-age=3600");
                    return response;
                }
                let content_type = mime::mime_for(relative);
                let mut response = ResponseDescriptor::bytes(200, content, content_type);
                response.add_header("ETag", &etag);
                response.add_header("Cache-Control", "public, max-age=3600");
                response
            }
            None => not_found(),
        }
    }
}

fn not_found() -> ResponseDescriptor {
    ResponseDescriptor::text(404, "404 Not Found".to_string())
}

/// Read an asset below the static root, refusing paths that escape it.
async fn load_asset(static_dir: &Path, relative: &str) -> Option<Vec<u8>> {
    let file_path = static_dir.join(relative.trim_start_matches('/'));

    let static_dir_canonical = match static_dir.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{}': {e}",
                static_dir.display()
            ));
            return None;
        }
    };
    // Missing files are an ordinary 404, not worth a log line
    let file_path_canonical = file_path.canonicalize().ok()?;
    if !file_path_canonical.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {relative} -> {}",
            file_path_canonical.display()
        ));
        return None;
    }
    if !file_path_canonical.is_file() {
        return None;
    }

    match fs::read(&file_path_canonical).await {
        Ok(content) => Some(content),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path_canonical.display()
            ));
            None
        }
    }
}
