// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub apps: AppsConfig,
    pub debug: DebugConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Application loading configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppsConfig {
    /// Directory scanned for app manifests at startup
    pub root_dir: String,
}

/// Debug introspection configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    /// Expose the buffered recent-log snapshot endpoint
    pub log_endpoint: bool,
    /// Number of recent log records retained for the snapshot
    pub log_buffer_size: usize,
    /// Directory holding the bundled debug UI assets
    #[serde(default)]
    pub assets_dir: Option<String>,
}
