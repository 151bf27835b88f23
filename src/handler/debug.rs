//! Debug introspection module
//!
//! Read-only operational endpoints for a single app: page and fragment
//! listings, a snapshot of recent logs, and the bundled debug UI assets.
//! Never mutates the app it inspects.

use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::app::App;
use crate::http::{mime, ResponseDescriptor};
use crate::logger::DebugAppender;

/// Reads a bundled debug UI asset by path. `None` means the asset does
/// not exist; `Some(Err(..))` is a read failure on an existing asset.
pub trait DebugAssetStore: Send + Sync {
    fn read(&self, path: &str) -> Option<io::Result<Vec<u8>>>;
}

/// Asset store over a directory on disk. Asset paths keep their
/// debug-space prefix, so the directory mirrors the URL layout
/// (`<root>/debug/index.html` serves `/debug/`).
pub struct DirDebugAssets {
    root: PathBuf,
}

impl DirDebugAssets {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

impl DebugAssetStore for DirDebugAssets {
    fn read(&self, path: &str) -> Option<io::Result<Vec<u8>>> {
        let file_path = self.root.join(path.trim_start_matches('/'));
        if !file_path.is_file() {
            return None;
        }
        Some(std::fs::read(&file_path))
    }
}

/// Store with no assets; every lookup is absent.
pub struct NoDebugAssets;

impl DebugAssetStore for NoDebugAssets {
    fn read(&self, _path: &str) -> Option<io::Result<Vec<u8>>> {
        None
    }
}

/// The debug routes, in match order. Classification is explicit so an
/// unmatched debug path surfaces as a contract violation instead of a
/// silent 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebugRoute {
    Pages,
    Fragments,
    Logs,
    Asset,
    Unmatched,
}

fn route(path: &str) -> DebugRoute {
    if path == "/debug/api/pages/" {
        return DebugRoute::Pages;
    }
    if path.starts_with("/debug/api/fragments/") {
        return DebugRoute::Fragments;
    }
    if path.starts_with("/debug/logs") {
        return DebugRoute::Logs;
    }
    if path.starts_with("/debug/") {
        return DebugRoute::Asset;
    }
    DebugRoute::Unmatched
}

/// Serves the debug routes for any app.
pub struct DebugIntrospector {
    assets: Box<dyn DebugAssetStore>,
    appender: Option<Arc<DebugAppender>>,
}

impl DebugIntrospector {
    #[must_use]
    pub fn new(assets: Box<dyn DebugAssetStore>, appender: Option<Arc<DebugAppender>>) -> Self {
        Self { assets, appender }
    }

    /// Resolve a debug request (app context already stripped).
    ///
    /// `Err` carries the server-side detail of a routing contract
    /// violation; the dispatcher converts it into a logged 500.
    pub fn render_debug(
        &self,
        app: &App,
        path_without_context: &str,
    ) -> Result<ResponseDescriptor, String> {
        match route(path_without_context) {
            DebugRoute::Pages => Ok(self.list_pages(app)),
            DebugRoute::Fragments => Ok(self.list_fragments(app)),
            DebugRoute::Logs => Ok(self.logs()),
            DebugRoute::Asset => Ok(self.asset(path_without_context)),
            DebugRoute::Unmatched => Err(format!(
                "no debug handler matches '{path_without_context}'"
            )),
        }
    }

    /// All page URIs across every component, deduplicated.
    ///
    /// A page mounted in several components collapses to a single entry;
    /// the per-component distinction is lost.
    fn list_pages(&self, app: &App) -> ResponseDescriptor {
        let uris: BTreeSet<&str> = app
            .components()
            .values()
            .flat_map(|component| component.pages().iter().map(crate::app::Page::uri))
            .collect();
        json_of(&uris)
    }

    /// All fragment names across every component, deduplicated.
    fn list_fragments(&self, app: &App) -> ResponseDescriptor {
        let names: BTreeSet<&str> = app
            .components()
            .values()
            .flat_map(|component| component.fragments().keys().map(String::as_str))
            .collect();
        json_of(&names)
    }

    fn logs(&self) -> ResponseDescriptor {
        match &self.appender {
            None => ResponseDescriptor::status_only(410),
            Some(appender) => ResponseDescriptor::json(appender.snapshot_json()),
        }
    }

    fn asset(&self, path: &str) -> ResponseDescriptor {
        let mut asset_path = path.to_string();
        if asset_path.ends_with('/') {
            asset_path.push_str("index.html");
        }
        match self.assets.read(&asset_path) {
            None => ResponseDescriptor::status_only(404),
            Some(Err(e)) => ResponseDescriptor::text(500, e.to_string()),
            Some(Ok(content)) => {
                let content_type = mime::mime_for(&asset_path);
                ResponseDescriptor::bytes(200, content, content_type)
            }
        }
    }
}

fn json_of(value: &impl serde::Serialize) -> ResponseDescriptor {
    match serde_json::to_string(value) {
        Ok(body) => ResponseDescriptor::json(body),
        Err(e) => ResponseDescriptor::text(500, format!("serialization failed: {e}")),
    }
}
