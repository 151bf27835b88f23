//! HTTP response descriptor module
//!
//! Transport-independent response value built by the dispatcher and its
//! collaborators, plus the conversion into a hyper response. Headers are
//! an ordered list and duplicate names are kept as added.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::logger;

/// Response body payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Text(String),
    Bytes(Vec<u8>),
}

impl Body {
    /// Textual body content, if this body is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bytes(_) => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Bytes(bytes) => bytes.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Concrete response: status, body, ordered headers, content type.
///
/// Built incrementally: base status/body first, then any headers merged in
/// (no dedup), and the content type set or overridden last.
#[derive(Debug, Clone)]
pub struct ResponseDescriptor {
    pub status: u16,
    pub body: Body,
    pub headers: Vec<(String, String)>,
    pub content_type: Option<String>,
}

impl ResponseDescriptor {
    /// Bare status with an empty body.
    #[must_use]
    pub fn status_only(status: u16) -> Self {
        Self {
            status,
            body: Body::Text(String::new()),
            headers: Vec::new(),
            content_type: None,
        }
    }

    /// 200 response carrying rendered markup; the caller sets the
    /// content type after merging accumulated headers.
    #[must_use]
    pub fn ok(markup: String) -> Self {
        Self {
            status: 200,
            body: Body::Text(markup),
            headers: Vec::new(),
            content_type: None,
        }
    }

    /// Plain-text response for a given status.
    #[must_use]
    pub fn text(status: u16, message: String) -> Self {
        Self {
            status,
            body: Body::Text(message),
            headers: Vec::new(),
            content_type: Some("text/plain".to_string()),
        }
    }

    /// 200 JSON response.
    #[must_use]
    pub fn json(body: String) -> Self {
        Self {
            status: 200,
            body: Body::Text(body),
            headers: Vec::new(),
            content_type: Some("application/json".to_string()),
        }
    }

    /// Binary response with an explicit content type.
    #[must_use]
    pub fn bytes(status: u16, data: Vec<u8>, content_type: &str) -> Self {
        Self {
            status,
            body: Body::Bytes(data),
            headers: Vec::new(),
            content_type: Some(content_type.to_string()),
        }
    }

    /// Redirect with a `Location` header and no body.
    #[must_use]
    pub fn redirect(status: u16, location: &str) -> Self {
        Self {
            status,
            body: Body::Text(String::new()),
            headers: vec![("Location".to_string(), location.to_string())],
            content_type: None,
        }
    }

    /// Append a header; existing entries with the same name are kept.
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    /// Set or override the content type.
    pub fn set_content_type(&mut self, content_type: &str) {
        self.content_type = Some(content_type.to_string());
    }

    /// All values carried for a header name, in insertion order.
    #[must_use]
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Convert into a hyper response for the transport layer.
    #[must_use]
    pub fn into_hyper(self) -> Response<Full<Bytes>> {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut builder = Response::builder().status(status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(content_type) = &self.content_type {
            builder = builder.header("Content-Type", content_type.as_str());
        }
        let body = match self.body {
            Body::Text(text) => Bytes::from(text),
            Body::Bytes(bytes) => Bytes::from(bytes),
        };
        builder.body(Full::new(body)).unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build {status} response: {e}"));
            let mut fallback = Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_response_sets_plain_content_type() {
        let response = ResponseDescriptor::text(404, "missing".to_string());
        assert_eq!(response.status, 404);
        assert_eq!(response.content_type.as_deref(), Some("text/plain"));
        assert_eq!(response.body.as_text(), Some("missing"));
    }

    #[test]
    fn test_redirect_carries_location() {
        let response = ResponseDescriptor::redirect(301, "localhost/store/cart/");
        assert_eq!(response.status, 301);
        assert_eq!(response.header_values("Location"), vec!["localhost/store/cart/"]);
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_duplicate_headers_preserved_in_order() {
        let mut response = ResponseDescriptor::ok("<html/>".to_string());
        response.add_header("Set-Cookie", "a=1");
        response.add_header("Set-Cookie", "b=2");
        assert_eq!(response.header_values("Set-Cookie"), vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_into_hyper_keeps_status_and_duplicates() {
        let mut response = ResponseDescriptor::ok("hi".to_string());
        response.add_header("X-Tag", "1");
        response.add_header("X-Tag", "2");
        response.set_content_type("text/html");
        let hyper_response = response.into_hyper();
        assert_eq!(hyper_response.status(), StatusCode::OK);
        let tags: Vec<_> = hyper_response.headers().get_all("X-Tag").iter().collect();
        assert_eq!(tags.len(), 2);
        assert_eq!(
            hyper_response.headers().get("Content-Type").unwrap(),
            "text/html"
        );
    }
}
