//! Multi-tenant web app rendering server.
//!
//! Applications are mounted under context paths and loaded once at
//! startup; a single dispatcher classifies every request (static asset,
//! debug endpoint, fragment, or page), renders through the owning app,
//! and converts every outcome into an HTTP response.

pub mod app;
pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
