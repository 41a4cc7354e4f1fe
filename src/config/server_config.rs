use crate::config::Cli;

/// Listener and request-handling settings taken from the command line
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub cache_schemas: bool,
}

impl ServerConfig {
    /// Address string accepted by `TcpListener::bind` (host names are resolved)
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&Cli::new("endpoints.json"))
    }
}

impl From<&Cli> for ServerConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            host: cli.host.clone(),
            port: cli.port,
            log_level: cli.log_level.clone(),
            cache_schemas: !cli.no_schema_cache,
        }
    }
}
