// Configuration module entry point
// Loads layered configuration: TOML file, environment overrides, defaults

mod types;

use std::net::SocketAddr;

// Re-export public types
pub use types::{
    AppsConfig, Config, DebugConfig, LoggingConfig, PerformanceConfig, ServerConfig,
};

impl Config {
    /// Load configuration from the specified file path (without extension).
    /// Default config file is "config.toml" when no path is specified.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("FRESCO").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("apps.root_dir", "apps")?
            .set_default("debug.log_endpoint", true)?
            .set_default("debug.log_buffer_size", 512)?
            .build()?;

        settings.try_deserialize()
    }

    /// Load from the default "config" file stem.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
