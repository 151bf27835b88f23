//! MIME type resolution module
//!
//! Maps a resource path's extension to a Content-Type string.

/// Resolve the Content-Type for a resource path.
///
/// The extension is the lowercased substring after the last `.`; a path
/// with no `.` is treated as the extension itself (it will almost never
/// match the table and falls through to the default). Unknown extensions
/// resolve to `text/html`, the markup type this server serves by default.
///
/// # Examples
/// ```
/// use fresco::http::mime::mime_for;
/// assert_eq!(mime_for("index.html"), "text/html");
/// assert_eq!(mime_for("style.css"), "text/css");
/// assert_eq!(mime_for("noext"), "text/html");
/// ```
#[must_use]
pub fn mime_for(resource_path: &str) -> &'static str {
    let extension = match resource_path.rfind('.') {
        Some(index) => &resource_path[index + 1..],
        None => resource_path,
    };

    match extension.to_ascii_lowercase().as_str() {
        // Text
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "txt" | "md" => "text/plain",
        "xml" => "application/xml",

        // JavaScript/WASM
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        // Documents
        "pdf" => "application/pdf",
        "zip" => "application/zip",

        // Default: rendered markup
        _ => "text/html",
    }
}
