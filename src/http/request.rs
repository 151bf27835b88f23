//! Normalized request module
//!
//! An immutable view of one inbound HTTP request, with the app context
//! (the leading path segment identifying the tenant) and the remaining
//! path derived exactly once at construction.

/// Immutable request value consumed by the dispatcher.
#[derive(Debug, Clone)]
pub struct Request {
    /// Full request path as received (query string excluded)
    pub path: String,
    /// Host header value, empty when the client sent none
    pub host: String,
    /// Request headers in arrival order
    pub headers: Vec<(String, String)>,
    /// Leading path segment identifying the owning app (e.g. `/store`)
    pub app_context: String,
    /// Path remainder after the app context, `/` when empty
    pub path_without_context: String,
}

impl Request {
    /// Build a request from its raw parts, deriving the context split once.
    #[must_use]
    pub fn new(path: &str, host: &str, headers: Vec<(String, String)>) -> Self {
        let (app_context, path_without_context) = split_app_context(path);
        Self {
            path: path.to_string(),
            host: host.to_string(),
            headers,
            app_context,
            path_without_context,
        }
    }

    /// Build a request from an inbound hyper request.
    #[must_use]
    pub fn from_hyper<B>(req: &hyper::Request<B>) -> Self {
        let host = req
            .headers()
            .get(hyper::header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let headers = req
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        Self::new(req.uri().path(), host, headers)
    }

    /// Look up a request header value, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Split a request path into app context and remainder.
///
/// `/store/cart` -> (`/store`, `/cart`); a bare context (`/store` or
/// `/store/`) gets remainder `/`. The root path maps to context `/`.
#[must_use]
pub fn split_app_context(path: &str) -> (String, String) {
    let Some(stripped) = path.strip_prefix('/') else {
        return (path.to_string(), "/".to_string());
    };
    if stripped.is_empty() {
        return ("/".to_string(), "/".to_string());
    }
    match stripped.find('/') {
        Some(index) => {
            let context = format!("/{}", &stripped[..index]);
            let rest = &stripped[index..];
            let remainder = if rest == "/" { "/".to_string() } else { rest.to_string() };
            (context, remainder)
        }
        None => (format!("/{stripped}"), "/".to_string()),
    }
}
