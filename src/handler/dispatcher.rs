//! Request dispatch module
//!
//! The orchestrator: consumes one normalized request, resolves the owning
//! app, branches on the request's classification, and converts every
//! render outcome into a concrete response. This is the single failure
//! boundary; nothing past it sees anything but a response descriptor.

use std::sync::Arc;

use crate::app::{RenderResult, RequestLookup};
use crate::http::{Request, ResponseDescriptor};
use crate::logger;
use crate::routing::{classifier, AppRegistry};

use super::debug::DebugIntrospector;
use super::static_files::StaticResolver;

/// Markup content type for rendered pages and fragments.
const MARKUP_MIME: &str = "text/html";

pub struct Dispatcher {
    registry: Arc<AppRegistry>,
    statics: Arc<dyn StaticResolver>,
    debug: DebugIntrospector,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        registry: Arc<AppRegistry>,
        statics: Arc<dyn StaticResolver>,
        debug: DebugIntrospector,
    ) -> Self {
        Self {
            registry,
            statics,
            debug,
        }
    }

    /// Serve one request to completion. Always returns a response.
    pub async fn serve(&self, request: &Request) -> ResponseDescriptor {
        // Debug traffic stays out of the access log
        if !classifier::is_debug_request(request) {
            logger::log_request("GET", &request.path);
        }

        if !classifier::is_valid(request) {
            return error_response(400, &format!("Invalid URI '{}'.", request.path));
        }

        let Some(app) = self.registry.get_by_context(&request.app_context) else {
            return error_response(
                404,
                &format!(
                    "Cannot find an app for context '{}'.",
                    request.app_context
                ),
            );
        };

        if classifier::is_static_resource_request(request) {
            return self.statics.resolve(app, request).await;
        }

        if classifier::is_debug_request(request) {
            return match self.debug.render_debug(app, &request.path_without_context) {
                Ok(response) => response,
                Err(detail) => internal_error_response(&request.path, &detail),
            };
        }

        let mut lookup = RequestLookup::new(request);
        let result = if classifier::is_fragment_request(request) {
            app.render_fragment(&request.path_without_context, &mut lookup)
        } else {
            match app.render_page(&request.path_without_context, &mut lookup) {
                RenderResult::NotFound(message) => {
                    // A missing or extra trailing slash earns a permanent
                    // redirect when the sibling page exists.
                    let toggled = toggle_trailing_slash(&request.path_without_context);
                    if app.has_page(&toggled) {
                        RenderResult::Redirect {
                            status: 301,
                            location: format!(
                                "{}{}{}",
                                request.host, request.app_context, toggled
                            ),
                        }
                    } else {
                        RenderResult::NotFound(message)
                    }
                }
                other => other,
            }
        };

        finish(request, &lookup, result)
    }
}

/// Convert a render outcome into the response, merging accumulated
/// headers on success. The single conversion point for every outcome.
fn finish(
    request: &Request,
    lookup: &RequestLookup,
    result: RenderResult,
) -> ResponseDescriptor {
    match result {
        RenderResult::Ok(markup) => {
            let mut response = ResponseDescriptor::ok(markup);
            for (name, value) in lookup.response_headers() {
                response.add_header(name, value);
            }
            response.set_content_type(MARKUP_MIME);
            response
        }
        RenderResult::NotFound(message) => error_response(404, &message),
        RenderResult::Redirect { status, location } => {
            ResponseDescriptor::redirect(status, &location)
        }
        RenderResult::HttpError { status, message } => error_response(status, &message),
        RenderResult::Internal(detail) => internal_error_response(&request.path, &detail),
    }
}

fn error_response(status: u16, message: &str) -> ResponseDescriptor {
    ResponseDescriptor::text(status, message.to_string())
}

/// Generic 500: the client gets no detail, the error log gets all of it.
fn internal_error_response(path: &str, detail: &str) -> ResponseDescriptor {
    let message = format!("An unexpected error occurred while serving '{path}'.");
    logger::log_internal_error(&message, detail);
    error_response(500, &message)
}

/// Toggle the trailing `/` of a path: strip it when present, append it
/// otherwise. The bare root toggles to the empty string.
fn toggle_trailing_slash(path: &str) -> String {
    path.strip_suffix('/')
        .map_or_else(|| format!("{path}/"), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{App, Component, Fragment, Page, RawMarkup, Renderable};
    use crate::handler::debug::NoDebugAssets;
    use crate::handler::static_files::DiskStaticResolver;
    use crate::logger::DebugAppender;

    fn markup(text: &str) -> Box<RawMarkup> {
        Box::new(RawMarkup(text.to_string()))
    }

    struct HeaderSettingPage;

    impl Renderable for HeaderSettingPage {
        fn render(&self, lookup: &mut RequestLookup) -> RenderResult {
            lookup.add_response_header("A", "1");
            lookup.add_response_header("A", "2");
            RenderResult::Ok("<html>headers</html>".to_string())
        }
    }

    struct FailingPage;

    impl Renderable for FailingPage {
        fn render(&self, _lookup: &mut RequestLookup) -> RenderResult {
            RenderResult::Internal("renderer exploded".to_string())
        }
    }

    struct TeapotPage;

    impl Renderable for TeapotPage {
        fn render(&self, _lookup: &mut RequestLookup) -> RenderResult {
            RenderResult::HttpError {
                status: 418,
                message: "I'm a teapot".to_string(),
            }
        }
    }

    struct MovedPage;

    impl Renderable for MovedPage {
        fn render(&self, _lookup: &mut RequestLookup) -> RenderResult {
            RenderResult::Redirect {
                status: 302,
                location: "localhost:8080/store/about".to_string(),
            }
        }
    }

    fn store_app() -> App {
        let root = Component::new(
            "root",
            vec![
                Page::new("/", markup("<html>home</html>")),
                Page::new("/cart/", markup("<html>cart</html>")),
                Page::new("/about", markup("<html>about</html>")),
                Page::new("/headers", Box::new(HeaderSettingPage)),
                Page::new("/broken", Box::new(FailingPage)),
                Page::new("/teapot", Box::new(TeapotPage)),
                Page::new("/moved", Box::new(MovedPage)),
            ],
            vec![Fragment::new("menu", markup("<div>menu</div>"))],
        );
        App::new("/store", "store", vec![root], None)
    }

    fn docs_app() -> App {
        let root = Component::new(
            "root",
            vec![Page::new("/", markup("<html>docs</html>"))],
            Vec::new(),
        );
        App::new("/docs", "docs", vec![root], None)
    }

    fn dispatcher(appender: Option<Arc<DebugAppender>>) -> Dispatcher {
        let registry = Arc::new(AppRegistry::from_apps(vec![store_app(), docs_app()]));
        Dispatcher::new(
            registry,
            Arc::new(DiskStaticResolver),
            DebugIntrospector::new(Box::new(NoDebugAssets), appender),
        )
    }

    fn request(path: &str) -> Request {
        Request::new(path, "localhost:8080", Vec::new())
    }

    #[tokio::test]
    async fn test_known_page_renders_as_html() {
        let response = dispatcher(None).serve(&request("/store/about")).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type.as_deref(), Some("text/html"));
        assert_eq!(response.body.as_text(), Some("<html>about</html>"));
    }

    #[tokio::test]
    async fn test_each_registered_context_serves_its_own_root() {
        let d = dispatcher(None);
        let store = d.serve(&request("/store/")).await;
        let docs = d.serve(&request("/docs/")).await;
        assert_eq!(store.body.as_text(), Some("<html>home</html>"));
        assert_eq!(docs.body.as_text(), Some("<html>docs</html>"));
    }

    #[tokio::test]
    async fn test_unknown_context_is_404_regardless_of_path() {
        let d = dispatcher(None);
        for path in ["/nope", "/nope/", "/nope/about", "/nope/debug/logs"] {
            let response = d.serve(&request(path)).await;
            assert_eq!(response.status, 404, "path {path}");
            assert!(response
                .body
                .as_text()
                .unwrap()
                .contains("Cannot find an app for context '/nope'."));
        }
    }

    #[tokio::test]
    async fn test_invalid_uri_is_400() {
        let response = dispatcher(None).serve(&request("/store/../etc")).await;
        assert_eq!(response.status, 400);
        assert!(response
            .body
            .as_text()
            .unwrap()
            .contains("Invalid URI '/store/../etc'."));
    }

    #[tokio::test]
    async fn test_serving_is_idempotent() {
        let d = dispatcher(None);
        let first = d.serve(&request("/store/about")).await;
        let second = d.serve(&request("/store/about")).await;
        assert_eq!(first.status, second.status);
        assert_eq!(first.body, second.body);
    }

    #[tokio::test]
    async fn test_missing_trailing_slash_redirects_to_existing_variant() {
        // `/cart/` exists, `/cart` does not
        let response = dispatcher(None).serve(&request("/store/cart")).await;
        assert_eq!(response.status, 301);
        assert_eq!(
            response.header_values("Location"),
            vec!["localhost:8080/store/cart/"]
        );
    }

    #[tokio::test]
    async fn test_extra_trailing_slash_redirects_to_existing_variant() {
        // `/about` exists, `/about/` does not
        let response = dispatcher(None).serve(&request("/store/about/")).await;
        assert_eq!(response.status, 301);
        assert_eq!(
            response.header_values("Location"),
            vec!["localhost:8080/store/about"]
        );
    }

    #[tokio::test]
    async fn test_page_with_no_variant_is_404() {
        let response = dispatcher(None).serve(&request("/store/missing")).await;
        assert_eq!(response.status, 404);
        assert!(response.body.as_text().unwrap().contains("/missing"));
    }

    #[tokio::test]
    async fn test_fragment_request_renders_fragment() {
        let response = dispatcher(None)
            .serve(&request("/store/fragments/menu"))
            .await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body.as_text(), Some("<div>menu</div>"));
        assert_eq!(response.content_type.as_deref(), Some("text/html"));
    }

    #[tokio::test]
    async fn test_missing_fragment_is_404() {
        let response = dispatcher(None)
            .serve(&request("/store/fragments/nope"))
            .await;
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_render_time_headers_merge_without_dedup() {
        let response = dispatcher(None).serve(&request("/store/headers")).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.header_values("A"), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_declared_http_error_passes_through() {
        let response = dispatcher(None).serve(&request("/store/teapot")).await;
        assert_eq!(response.status, 418);
        assert_eq!(response.body.as_text(), Some("I'm a teapot"));
        assert_eq!(response.content_type.as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_render_signaled_redirect_passes_through() {
        let response = dispatcher(None).serve(&request("/store/moved")).await;
        assert_eq!(response.status, 302);
        assert_eq!(
            response.header_values("Location"),
            vec!["localhost:8080/store/about"]
        );
    }

    #[tokio::test]
    async fn test_internal_failure_is_generic_500() {
        let response = dispatcher(None).serve(&request("/store/broken")).await;
        assert_eq!(response.status, 500);
        let body = response.body.as_text().unwrap();
        assert!(body.contains("An unexpected error occurred"));
        assert!(!body.contains("renderer exploded"));
    }

    #[tokio::test]
    async fn test_debug_logs_endpoint_through_dispatch() {
        let without = dispatcher(None).serve(&request("/store/debug/logs")).await;
        assert_eq!(without.status, 410);

        let appender = Arc::new(DebugAppender::new(8));
        let with = dispatcher(Some(appender))
            .serve(&request("/store/debug/logs"))
            .await;
        assert_eq!(with.status, 200);
        assert_eq!(with.body.as_text(), Some("[]"));
    }

    #[tokio::test]
    async fn test_debug_pages_endpoint_through_dispatch() {
        let response = dispatcher(None)
            .serve(&request("/store/debug/api/pages/"))
            .await;
        assert_eq!(response.status, 200);
        let body = response.body.as_text().unwrap();
        assert!(body.contains("/about"));
        assert!(body.contains("/cart/"));
    }

    #[tokio::test]
    async fn test_favicon_falls_through_to_normal_dispatch() {
        let response = dispatcher(None).serve(&request("/favicon.ico")).await;
        assert_eq!(response.status, 404);
        assert!(response
            .body
            .as_text()
            .unwrap()
            .contains("Cannot find an app for context '/favicon.ico'."));
    }

    #[tokio::test]
    async fn test_concurrent_requests_stay_isolated() {
        let d = Arc::new(dispatcher(None));
        let mut handles = Vec::new();
        for i in 0..32 {
            let d = Arc::clone(&d);
            handles.push(tokio::spawn(async move {
                let path = if i % 2 == 0 { "/store/headers" } else { "/store/about" };
                (i, d.serve(&Request::new(path, "localhost:8080", Vec::new())).await)
            }));
        }
        for handle in handles {
            let (i, response) = handle.await.unwrap();
            assert_eq!(response.status, 200);
            if i % 2 == 0 {
                assert_eq!(response.header_values("A"), vec!["1", "2"]);
                assert_eq!(response.body.as_text(), Some("<html>headers</html>"));
            } else {
                assert!(response.header_values("A").is_empty());
                assert_eq!(response.body.as_text(), Some("<html>about</html>"));
            }
        }
    }

    #[test]
    fn test_toggle_trailing_slash() {
        assert_eq!(toggle_trailing_slash("/cart"), "/cart/");
        assert_eq!(toggle_trailing_slash("/cart/"), "/cart");
        assert_eq!(toggle_trailing_slash("/"), "");
    }
}
