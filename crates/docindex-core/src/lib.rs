//! Docindex Core - Shared error types and configuration
//!
//! This crate defines what the rest of the workspace shares:
//! - The `DocIndexError` enum and `Result` alias
//! - Vector database configuration management

pub mod config;

pub use config::{ConfigError, VectorDbConfig};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors surfaced by indexing and retrieval operations
#[derive(Error, Debug)]
pub enum DocIndexError {
    /// Low-level vector database failure, raised inside a store
    #[error("vector database error: {0}")]
    VectorDb(String),

    /// Upsert submission failed. Batches accepted before the failing one
    /// remain persisted.
    #[error("indexing failed: {0}")]
    IndexingFailed(String),

    /// Similarity query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Paragraphs and embeddings are paired positionally; unequal lengths
    /// are rejected instead of silently truncating to the shorter input.
    #[error("mismatched input lengths: {paragraphs} paragraphs, {embeddings} embeddings")]
    LengthMismatch { paragraphs: usize, embeddings: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DocIndexError {
    /// Recommended HTTP status for rendering this error at the API boundary.
    ///
    /// Upstream service failures map to 502 rather than reusing a single
    /// status for every cause.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::VectorDb(_) | Self::IndexingFailed(_) | Self::QueryFailed(_) => 502,
            Self::LengthMismatch { .. } => 400,
            Self::Config(_) | Self::Other(_) => 500,
        }
    }
}

impl From<ConfigError> for DocIndexError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DocIndexError>;

// ============================================================================
// Tests
// ============================================================================
