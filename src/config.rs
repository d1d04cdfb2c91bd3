//! Configuration types and loading.
//!
//! The config file is JSON and every load failure collapses into the one
//! [`ConfigError`] taxonomy, surfaced before any subcommand runs.

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot find config at {path}: {source}")]
    Missing { path: String, source: io::Error },

    #[error("config is invalid: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config is invalid: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub host: String,
    pub port: u16,
    pub endpoints: EndpointsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointsConfig {
    /// Relative path of the record-add endpoint.
    pub add: String,
    /// Relative path of the query endpoint.
    pub query: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Records per batch posted to the add endpoint.
    pub batch_size: u64,
}

impl Config {
    /// Load and validate the config file, defaulting to
    /// [`DEFAULT_CONFIG_PATH`] when no explicit path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Missing {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.host.is_empty() {
            return Err(ConfigError::Validation("storage.host must not be empty".to_string()));
        }
        if self.storage.endpoints.add.is_empty() || self.storage.endpoints.query.is_empty() {
            return Err(ConfigError::Validation(
                "storage.endpoints.add and storage.endpoints.query must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn query_url(&self) -> String {
        self.endpoint_url(&self.storage.endpoints.query)
    }

    pub fn add_url(&self) -> String {
        self.endpoint_url(&self.storage.endpoints.add)
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("http://{}:{}/{}", self.storage.host, self.storage.port, endpoint)
    }

    #[cfg(test)]
    pub(crate) fn from_parts(host: &str, port: u16, add: &str, query: &str, batch_size: u64) -> Self {
        Self {
            storage: StorageConfig {
                host: host.to_string(),
                port,
                endpoints: EndpointsConfig {
                    add: add.to_string(),
                    query: query.to_string(),
                },
            },
            worker: WorkerConfig { batch_size },
        }
    }
}
