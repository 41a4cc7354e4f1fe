mod tests;
mod server_config;
mod logging_config;
pub mod config;

use clap::Parser;
use std::path::PathBuf;

pub use config::{Config, ConfigError, EndpointEntry, EndpointsFile};
pub use logging_config::LoggingConfig;
pub use server_config::ServerConfig;

/// Command line arguments for the mock server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "protomock",
    about = "Serve JSON fixtures as protobuf responses for locally mapped API calls",
    after_help = "Point a proxy tool's remote mapping at this server, e.g.\n  Map From: https://api.yourapp.com/getProfile\n  Map To:   http://localhost:8080/getProfile"
)]
pub struct Cli {
    /// Port to run the server on
    #[arg(short = 'P', long, default_value_t = 8080)]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Path to the endpoints config file (.json or .toml)
    #[arg(short = 'c', long = "config", default_value = "endpoints.json")]
    pub config_path: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Recompile .proto files on every request
    #[arg(long)]
    pub no_schema_cache: bool,
}

impl Cli {
    /// Creates a new `Cli` with default settings for the given config file.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            port: 8080,
            host: "localhost".to_string(),
            config_path: config_path.into(),
            log_level: "info".to_string(),
            no_schema_cache: false,
        }
    }
}
