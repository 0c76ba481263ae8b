//! Configuration Management
//!
//! Handles vector database configuration from environment variables and
//! config files with sensible defaults for development.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const API_KEY_VAR: &str = "QDRANT_API_KEY";
const URL_VAR: &str = "QDRANT_URL";

const DEFAULT_URL: &str = "http://localhost:6334";
const DEFAULT_COLLECTION: &str = "document-indexer";

/// Vector dimension (must match embedding model)
pub const VECTOR_DIMENSION: usize = 1024;

/// Vector database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorDbConfig {
    /// Qdrant gRPC URL
    pub url: String,

    /// API key sent with every request
    pub api_key: String,

    /// Collection name
    pub collection: String,

    /// Vector dimension for the collection
    pub dimension: usize,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            api_key: String::new(),
            collection: DEFAULT_COLLECTION.to_string(),
            dimension: VECTOR_DIMENSION,
        }
    }
}

impl VectorDbConfig {
    /// Load configuration from environment variables.
    ///
    /// The API key is required; a missing key fails here rather than on the
    /// first request. The endpoint URL falls back to a local default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| ConfigError::MissingRequired(API_KEY_VAR.to_string()))?;

        let url = std::env::var(URL_VAR).unwrap_or_else(|_| DEFAULT_URL.to_string());

        Ok(Self {
            url,
            api_key,
            ..Self::default()
        })
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Self {
        // Always use env for the credential when present
        if let Ok(api_key) = std::env::var(API_KEY_VAR) {
            self.api_key = api_key;
        }
        if let Ok(url) = std::env::var(URL_VAR) {
            self.url = url;
        }
        self
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
