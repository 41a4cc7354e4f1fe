//! The endpoint registry: the immutable set of configured routes.

pub mod config;

pub use config::EndpointConfig;

use crate::config::{ConfigError, EndpointsFile};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// No endpoint is registered for the requested path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Endpoint not found: {path}")]
pub struct NotFound {
    pub path: String,
}

/// Configured endpoints in file order, indexed by exact path.
#[derive(Debug, Default)]
pub struct Registry {
    endpoints: Vec<EndpointConfig>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Load and validate an endpoints file.
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_path = config_path.as_ref();
        let file = EndpointsFile::from_path(config_path)?;
        Self::from_file(&file, &crate::config::config::base_dir(config_path))
    }

    /// Build from a parsed file; relative paths are resolved against `base_dir`.
    pub fn from_file(file: &EndpointsFile, base_dir: &Path) -> Result<Self, ConfigError> {
        file.validate()?;
        Self::from_endpoints(
            file.endpoints
                .iter()
                .map(|entry| EndpointConfig::from_entry(entry, base_dir))
                .collect(),
        )
    }

    pub fn from_endpoints(endpoints: Vec<EndpointConfig>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(endpoints.len());
        for (i, endpoint) in endpoints.iter().enumerate() {
            if index.insert(endpoint.path.clone(), i).is_some() {
                return Err(ConfigError::DuplicatePath(endpoint.path.clone()));
            }
        }
        Ok(Self { endpoints, index })
    }

    /// Exact, case-sensitive match on the request path.
    pub fn lookup(&self, path: &str) -> Result<&EndpointConfig, NotFound> {
        self.index
            .get(path)
            .map(|&i| &self.endpoints[i])
            .ok_or_else(|| NotFound {
                path: path.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointConfig> {
        self.endpoints.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.endpoints.iter().map(|e| e.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
