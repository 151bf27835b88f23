//! Application registry module
//!
//! Immutable mapping from app context path to loaded application, built
//! once at startup from a discoverer/creator pair and shared read-only
//! across request tasks.

use std::collections::HashMap;
use std::io;

use crate::app::loader::{AppCreator, AppDiscoverer};
use crate::app::App;
use crate::logger;

/// Context-path keyed registry of loaded applications.
#[derive(Debug)]
pub struct AppRegistry {
    apps: HashMap<String, App>,
}

impl AppRegistry {
    /// Discover and create every application, keyed by context.
    ///
    /// Any discovery or creation failure aborts the build; the registry
    /// is never published half-built. Duplicate contexts are rejected.
    pub fn load(
        discoverer: &dyn AppDiscoverer,
        creator: &dyn AppCreator,
    ) -> io::Result<Self> {
        let mut apps = HashMap::new();
        for reference in discoverer.app_references()? {
            let app = creator.create_app(&reference)?;
            logger::log_info(&format!("App '{}' created.", app.name()));
            if let Some(previous) = apps.insert(app.context().to_string(), app) {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "duplicate app context '{}' (already used by '{}')",
                        previous.context(),
                        previous.name()
                    ),
                ));
            }
        }
        Ok(Self { apps })
    }

    /// Build a registry from already-loaded applications.
    #[must_use]
    pub fn from_apps(apps: Vec<App>) -> Self {
        let apps = apps
            .into_iter()
            .map(|app| (app.context().to_string(), app))
            .collect();
        Self { apps }
    }

    /// Resolve the application mounted at the given context path.
    #[must_use]
    pub fn get_by_context(&self, context: &str) -> Option<&App> {
        self.apps.get(context)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.apps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Registered context paths, in no particular order.
    pub fn contexts(&self) -> impl Iterator<Item = &str> {
        self.apps.keys().map(String::as_str)
    }
}
