use crate::config::{Cli, LoggingConfig, ServerConfig};
use crate::endpoints::Registry;
use clap::Parser;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in config file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid TOML in config file {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Endpoint #{index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Endpoint #{index} path '{path}' must start with '/'")]
    InvalidPath { index: usize, path: String },

    #[error("Duplicate endpoint path '{0}'")]
    DuplicatePath(String),
}

/// One raw `endpoints` entry as written in the config file.
///
/// Fields default to empty so that a missing field is reported by
/// [`EndpointsFile::validate`] with the entry's position.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct EndpointEntry {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub json_file: String,
    #[serde(default)]
    pub proto_file: String,
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub proto_root: Option<String>,
}

/// The endpoints config file, in JSON or TOML.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EndpointsFile {
    #[serde(default)]
    pub endpoints: Vec<EndpointEntry>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EndpointsFile {
    /// Read a config file; `.toml` files are parsed as TOML, everything else as JSON.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        if is_toml {
            toml::from_str(&text).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })
        } else {
            serde_json::from_str(&text).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    /// Check required fields, path syntax and path uniqueness.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen: HashSet<&str> = HashSet::new();

        for (index, entry) in self.endpoints.iter().enumerate() {
            let required = [
                ("path", entry.path.as_str()),
                ("json_file", entry.json_file.as_str()),
                ("proto_file", entry.proto_file.as_str()),
                ("message_type", entry.message_type.as_str()),
            ];
            for (field, value) in required {
                if value.trim().is_empty() {
                    return Err(ConfigError::MissingField { index, field });
                }
            }

            if !entry.path.starts_with('/') {
                return Err(ConfigError::InvalidPath {
                    index,
                    path: entry.path.clone(),
                });
            }

            if !seen.insert(entry.path.as_str()) {
                return Err(ConfigError::DuplicatePath(entry.path.clone()));
            }
        }

        Ok(())
    }
}

/// Everything the server needs at startup.
#[derive(Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub registry: Registry,
    pub config_path: PathBuf,
}

impl Config {
    /// Parse the command line and load the endpoints file it names.
    pub fn from_args() -> Result<Self, ConfigError> {
        Self::from_cli(&Cli::parse())
    }

    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let file = EndpointsFile::from_path(&cli.config_path)?;
        let registry = Registry::from_file(&file, &base_dir(&cli.config_path))?;

        Ok(Self {
            server: ServerConfig::from(cli),
            logging: file.logging,
            registry,
            config_path: cli.config_path.clone(),
        })
    }
}

/// Directory that relative paths in a config file are resolved against.
pub(crate) fn base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
