//! Request handler module
//!
//! The dispatch path from one inbound request to one response: the
//! dispatcher itself, static asset resolution, and the debug
//! introspection endpoints.

pub mod debug;
pub mod dispatcher;
pub mod static_files;

// Re-export main entry points
pub use debug::{DebugAssetStore, DebugIntrospector, DirDebugAssets, NoDebugAssets};
pub use dispatcher::Dispatcher;
pub use static_files::{DiskStaticResolver, StaticResolver};
