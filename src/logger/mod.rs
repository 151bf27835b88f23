//! Logger module
//!
//! Logging for the rendering server:
//! - Server lifecycle and error logging to stdout/stderr or files
//! - Access logging for served requests
//! - A bounded recent-log buffer feeding the debug logs endpoint
//!
//! Every line written is also mirrored into the attached `DebugAppender`
//! (when one is configured) so operators can tail recent activity over
//! HTTP without shell access.

mod buffer;
pub mod writer;

pub use buffer::{DebugAppender, LogRecord};

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::Local;

use crate::config::Config;

static DEBUG_APPENDER: OnceLock<Arc<DebugAppender>> = OnceLock::new();
static ACCESS_LOG: AtomicBool = AtomicBool::new(false);

/// Initialize the logger with configuration.
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    ACCESS_LOG.store(config.logging.access_log, Ordering::Relaxed);
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Attach the buffer that mirrors every log line for debug introspection.
/// Later calls are no-ops; the first attachment wins.
pub fn attach_debug_appender(appender: Arc<DebugAppender>) {
    let _ = DEBUG_APPENDER.set(appender);
}

fn write_out(level: &str, message: &str) {
    if let Some(appender) = DEBUG_APPENDER.get() {
        appender.append(level, message);
    }
    match writer::get() {
        Some(writer) => writer.write_out(message),
        None => println!("{message}"),
    }
}

fn write_error(level: &str, message: &str) {
    if let Some(appender) = DEBUG_APPENDER.get() {
        appender.append(level, message);
    }
    match writer::get() {
        Some(writer) => writer.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_info(message: &str) {
    write_out("INFO", message);
}

pub fn log_error(message: &str) {
    write_error("ERROR", &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error("WARN", &format!("[WARN] {message}"));
}

/// Log a generic client-facing failure together with its full detail.
/// The detail goes to the error log only, never into a response.
pub fn log_internal_error(message: &str, detail: &str) {
    write_error("ERROR", &format!("[ERROR] {message} {detail}"));
}

/// Access log line for one inbound request, when access logging is on.
pub fn log_request(method: &str, path: &str) {
    if !ACCESS_LOG.load(Ordering::Relaxed) {
        return;
    }
    let time = Local::now().format("%d/%b/%Y:%H:%M:%S %z");
    write_out("INFO", &format!("[{time}] \"{method} {path}\""));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error("ERROR", &format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_out("INFO", "======================================");
    write_out("INFO", "Rendering server started successfully");
    write_out("INFO", &format!("Listening on: http://{addr}"));
    write_out("INFO", &format!("App root: {}", config.apps.root_dir));
    if let Some(workers) = config.server.workers {
        write_out("INFO", &format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_out("INFO", &format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_out("INFO", &format!("Error log: {path}"));
    }
    write_out("INFO", "======================================\n");
}
