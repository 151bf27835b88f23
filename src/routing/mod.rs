//! Request routing module
//!
//! Classification of inbound requests and resolution of the owning
//! application by context path.

pub mod classifier;
pub mod registry;

pub use registry::AppRegistry;
