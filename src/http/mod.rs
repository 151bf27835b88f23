//! HTTP protocol layer module
//!
//! Protocol-level values and helpers shared across the dispatch path:
//! the normalized request, the response descriptor, mime resolution,
//! and cache revalidation.

pub mod cache;
pub mod mime;
pub mod request;
pub mod response;

// Re-export commonly used types
pub use request::Request;
pub use response::{Body, ResponseDescriptor};
