//! Application loading module
//!
//! Discovery and creation of applications at startup: a discoverer lists
//! candidate app directories, a creator turns each into a loaded `App`.
//! The disk implementations scan a root directory for `app.toml`
//! manifests describing the app's context, components, pages, and
//! fragments with inline or file-backed markup.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{App, Component, Fragment, Page, RawMarkup, Renderable};

/// A discovered candidate application.
#[derive(Debug, Clone)]
pub struct AppReference {
    /// Directory holding the app's manifest and content
    pub dir: PathBuf,
}

/// Lists candidate applications for the registry to load.
pub trait AppDiscoverer {
    fn app_references(&self) -> io::Result<Vec<AppReference>>;
}

/// Turns a discovered reference into a loaded application.
pub trait AppCreator {
    fn create_app(&self, reference: &AppReference) -> io::Result<App>;
}

/// Discoverer that scans a root directory for subdirectories containing
/// an `app.toml` manifest. Entries are returned in name order so startup
/// is deterministic.
pub struct DirAppDiscoverer {
    root: PathBuf,
}

impl DirAppDiscoverer {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

impl AppDiscoverer for DirAppDiscoverer {
    fn app_references(&self) -> io::Result<Vec<AppReference>> {
        let mut references = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let dir = entry.path();
            if dir.is_dir() && dir.join(MANIFEST_FILE).is_file() {
                references.push(AppReference { dir });
            }
        }
        references.sort_by(|a, b| a.dir.cmp(&b.dir));
        Ok(references)
    }
}

const MANIFEST_FILE: &str = "app.toml";

/// App manifest root.
#[derive(Debug, Deserialize)]
struct AppManifest {
    app: AppSection,
    #[serde(default, rename = "component")]
    components: Vec<ComponentSection>,
}

#[derive(Debug, Deserialize)]
struct AppSection {
    name: String,
    context: String,
    /// Static asset directory, relative to the app dir
    #[serde(default)]
    static_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ComponentSection {
    name: String,
    #[serde(default, rename = "page")]
    pages: Vec<PageSection>,
    #[serde(default, rename = "fragment")]
    fragments: Vec<FragmentSection>,
}

#[derive(Debug, Deserialize)]
struct PageSection {
    uri: String,
    #[serde(flatten)]
    source: MarkupSource,
}

#[derive(Debug, Deserialize)]
struct FragmentSection {
    name: String,
    #[serde(flatten)]
    source: MarkupSource,
}

/// Page/fragment markup is either inline in the manifest or read from a
/// file relative to the app directory.
#[derive(Debug, Deserialize)]
struct MarkupSource {
    #[serde(default)]
    markup: Option<String>,
    #[serde(default)]
    file: Option<String>,
}

impl MarkupSource {
    fn load(&self, app_dir: &Path, what: &str) -> io::Result<Box<dyn Renderable>> {
        match (&self.markup, &self.file) {
            (Some(markup), None) => Ok(Box::new(RawMarkup(markup.clone()))),
            (None, Some(file)) => {
                let markup = fs::read_to_string(app_dir.join(file))?;
                Ok(Box::new(RawMarkup(markup)))
            }
            _ => Err(invalid(format!(
                "{what} must declare exactly one of 'markup' or 'file'"
            ))),
        }
    }
}

/// Creator that parses `app.toml` manifests.
pub struct ManifestAppCreator;

impl AppCreator for ManifestAppCreator {
    fn create_app(&self, reference: &AppReference) -> io::Result<App> {
        let manifest_path = reference.dir.join(MANIFEST_FILE);
        let raw = fs::read_to_string(&manifest_path)?;
        let manifest: AppManifest = toml::from_str(&raw)
            .map_err(|e| invalid(format!("{}: {e}", manifest_path.display())))?;

        let context = &manifest.app.context;
        if !context.starts_with('/') || context.len() < 2 || context[1..].contains('/') {
            return Err(invalid(format!(
                "{}: context '{context}' must be a single non-root path segment",
                manifest_path.display()
            )));
        }

        let mut components = Vec::new();
        for section in &manifest.components {
            let mut pages = Vec::new();
            for page in &section.pages {
                let renderable = page
                    .source
                    .load(&reference.dir, &format!("page '{}'", page.uri))?;
                pages.push(Page::new(&page.uri, renderable));
            }
            let mut fragments = Vec::new();
            for fragment in &section.fragments {
                let renderable = fragment
                    .source
                    .load(&reference.dir, &format!("fragment '{}'", fragment.name))?;
                fragments.push(Fragment::new(&fragment.name, renderable));
            }
            components.push(Component::new(&section.name, pages, fragments));
        }

        let static_dir = manifest
            .app
            .static_dir
            .as_ref()
            .map(|dir| reference.dir.join(dir));

        Ok(App::new(
            &manifest.app.context,
            &manifest.app.name,
            components,
            static_dir,
        ))
    }
}

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_app(root: &Path, dir_name: &str, manifest: &str) {
        let dir = root.join(dir_name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("app.toml"), manifest).unwrap();
    }

    #[test]
    fn test_discovers_manifest_directories_in_order() {
        let root = tempfile::tempdir().unwrap();
        write_app(root.path(), "beta", "[app]\nname = \"b\"\ncontext = \"/b\"\n");
        write_app(root.path(), "alpha", "[app]\nname = \"a\"\ncontext = \"/a\"\n");
        fs::create_dir_all(root.path().join("not-an-app")).unwrap();

        let references = DirAppDiscoverer::new(root.path()).app_references().unwrap();
        assert_eq!(references.len(), 2);
        assert!(references[0].dir.ends_with("alpha"));
        assert!(references[1].dir.ends_with("beta"));
    }

    #[test]
    fn test_creates_app_from_manifest() {
        let root = tempfile::tempdir().unwrap();
        write_app(
            root.path(),
            "store",
            r#"
[app]
name = "store"
context = "/store"

[[component]]
name = "root"

[[component.page]]
uri = "/"
markup = "<html>home</html>"

[[component.fragment]]
name = "cart"
markup = "<div>cart</div>"
"#,
        );

        let reference = AppReference {
            dir: root.path().join("store"),
        };
        let app = ManifestAppCreator.create_app(&reference).unwrap();
        assert_eq!(app.name(), "store");
        assert_eq!(app.context(), "/store");
        assert!(app.has_page("/"));
        assert_eq!(app.components().len(), 1);
    }

    #[test]
    fn test_file_backed_markup() {
        let root = tempfile::tempdir().unwrap();
        write_app(
            root.path(),
            "docs",
            r#"
[app]
name = "docs"
context = "/docs"

[[component]]
name = "root"

[[component.page]]
uri = "/"
file = "pages/home.html"
"#,
        );
        let pages_dir = root.path().join("docs/pages");
        fs::create_dir_all(&pages_dir).unwrap();
        fs::write(pages_dir.join("home.html"), "<html>from file</html>").unwrap();

        let reference = AppReference {
            dir: root.path().join("docs"),
        };
        let app = ManifestAppCreator.create_app(&reference).unwrap();
        assert!(app.has_page("/"));
    }

    #[test]
    fn test_rejects_page_with_both_sources() {
        let root = tempfile::tempdir().unwrap();
        write_app(
            root.path(),
            "bad",
            r#"
[app]
name = "bad"
context = "/bad"

[[component]]
name = "root"

[[component.page]]
uri = "/"
markup = "<html/>"
file = "home.html"
"#,
        );
        let reference = AppReference {
            dir: root.path().join("bad"),
        };
        let err = ManifestAppCreator.create_app(&reference).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_rejects_root_context() {
        let root = tempfile::tempdir().unwrap();
        write_app(root.path(), "bad", "[app]\nname = \"bad\"\ncontext = \"/\"\n");
        let reference = AppReference {
            dir: root.path().join("bad"),
        };
        assert!(ManifestAppCreator.create_app(&reference).is_err());
    }
}
