//! Application domain model
//!
//! An application (tenant) is mounted under a context path and owns named
//! components, each holding pages and fragments. Applications are loaded
//! once at startup and shared read-only across concurrent requests; all
//! rendering goes through the `Renderable` seam so the markup engine can
//! be swapped without touching dispatch.

pub mod loader;

use std::collections::HashMap;
use std::path::PathBuf;

use crate::http::Request;

/// Outcome of a render operation.
///
/// Render paths return values from this closed set instead of raising;
/// the dispatcher converts each variant into a response exactly once.
/// `Internal` carries server-side detail that is logged and never placed
/// in a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderResult {
    /// Rendered markup
    Ok(String),
    /// No matching page or fragment; message is client-safe
    NotFound(String),
    /// Client should re-request the given location
    Redirect { status: u16, location: String },
    /// A declared failure with an explicit status and client-safe message
    HttpError { status: u16, message: String },
    /// Unexpected failure; detail stays server-side
    Internal(String),
}

/// Per-request mutable context handed into render calls.
///
/// Owned exclusively by the task serving one request; accumulates the
/// response headers set during rendering and is discarded once the
/// response is built.
#[derive(Debug)]
pub struct RequestLookup {
    request_path: String,
    response_headers: Vec<(String, String)>,
}

impl RequestLookup {
    #[must_use]
    pub fn new(request: &Request) -> Self {
        Self {
            request_path: request.path.clone(),
            response_headers: Vec::new(),
        }
    }

    /// Full path of the request being served.
    #[must_use]
    pub fn request_path(&self) -> &str {
        &self.request_path
    }

    /// Record a response header; duplicates are kept in insertion order.
    pub fn add_response_header(&mut self, name: &str, value: &str) {
        self.response_headers
            .push((name.to_string(), value.to_string()));
    }

    /// Headers accumulated so far, in insertion order.
    #[must_use]
    pub fn response_headers(&self) -> &[(String, String)] {
        &self.response_headers
    }
}

/// The seam to the markup engine.
///
/// Implementations must be safe to call from concurrent request tasks;
/// all per-request state lives in the `RequestLookup`.
pub trait Renderable: Send + Sync {
    fn render(&self, lookup: &mut RequestLookup) -> RenderResult;
}

/// Renderable that returns fixed markup as-is.
pub struct RawMarkup(pub String);

impl Renderable for RawMarkup {
    fn render(&self, _lookup: &mut RequestLookup) -> RenderResult {
        RenderResult::Ok(self.0.clone())
    }
}

/// A top-level renderable unit addressable by a client-facing path.
pub struct Page {
    uri: String,
    renderable: Box<dyn Renderable>,
}

impl Page {
    #[must_use]
    pub fn new(uri: &str, renderable: Box<dyn Renderable>) -> Self {
        Self {
            uri: uri.to_string(),
            renderable,
        }
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// A partial renderable unit invoked by name via the fragments path.
pub struct Fragment {
    name: String,
    renderable: Box<dyn Renderable>,
}

impl Fragment {
    #[must_use]
    pub fn new(name: &str, renderable: Box<dyn Renderable>) -> Self {
        Self {
            name: name.to_string(),
            renderable,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A named grouping of pages and fragments within an app.
pub struct Component {
    name: String,
    pages: Vec<Page>,
    fragments: HashMap<String, Fragment>,
}

impl Component {
    #[must_use]
    pub fn new(name: &str, pages: Vec<Page>, fragments: Vec<Fragment>) -> Self {
        let fragments = fragments
            .into_iter()
            .map(|fragment| (fragment.name.clone(), fragment))
            .collect();
        Self {
            name: name.to_string(),
            pages,
            fragments,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    #[must_use]
    pub fn fragments(&self) -> &HashMap<String, Fragment> {
        &self.fragments
    }
}

/// A loaded application, immutable for the registry's lifetime.
pub struct App {
    context: String,
    name: String,
    components: HashMap<String, Component>,
    static_dir: Option<PathBuf>,
}

impl App {
    #[must_use]
    pub fn new(
        context: &str,
        name: &str,
        components: Vec<Component>,
        static_dir: Option<PathBuf>,
    ) -> Self {
        let components = components
            .into_iter()
            .map(|component| (component.name.clone(), component))
            .collect();
        Self {
            context: context.to_string(),
            name: name.to_string(),
            components,
            static_dir,
        }
    }

    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn components(&self) -> &HashMap<String, Component> {
        &self.components
    }

    /// Root directory for this app's static assets, when it has any.
    #[must_use]
    pub fn static_dir(&self) -> Option<&PathBuf> {
        self.static_dir.as_ref()
    }

    /// Render the page addressed by `path` (app context already stripped).
    pub fn render_page(&self, path: &str, lookup: &mut RequestLookup) -> RenderResult {
        match self.find_page(path) {
            Some(page) => page.renderable.render(lookup),
            None => RenderResult::NotFound(format!("Requested page '{path}' does not exist.")),
        }
    }

    /// Whether any component owns a page with exactly this path.
    #[must_use]
    pub fn has_page(&self, path: &str) -> bool {
        self.find_page(path).is_some()
    }

    /// Render the fragment invoked via `path` (`/fragments/<name>`).
    pub fn render_fragment(&self, path: &str, lookup: &mut RequestLookup) -> RenderResult {
        let name = path
            .strip_prefix("/fragments/")
            .unwrap_or(path)
            .trim_end_matches('/');
        let fragment = self
            .components
            .values()
            .find_map(|component| component.fragments.get(name));
        match fragment {
            Some(fragment) => fragment.renderable.render(lookup),
            None => RenderResult::NotFound(format!("Requested fragment '{name}' does not exist.")),
        }
    }

    fn find_page(&self, path: &str) -> Option<&Page> {
        self.components
            .values()
            .find_map(|component| component.pages.iter().find(|page| page.uri == path))
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("context", &self.context)
            .field("name", &self.name)
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .field("static_dir", &self.static_dir)
            .finish()
    }
}
