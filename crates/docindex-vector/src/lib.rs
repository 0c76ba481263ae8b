//! Docindex Vector - Thin client over an external vector database
//!
//! Stores one record per document paragraph and retrieves the best-matching
//! paragraph texts for a query embedding. Storage, indexing, and similarity
//! search all belong to the external service (Qdrant); this crate shapes
//! payloads, batches upserts, and translates service errors.

use async_trait::async_trait;
use docindex_core::Result;

pub mod index;
pub mod qdrant_store;

pub use index::DocumentIndex;
pub use qdrant_store::QdrantStore;

/// Number of paragraphs returned per retrieval
pub const TOP_K_PARAGRAPHS: usize = 3;

/// Maximum records submitted in one upsert call
pub const UPSERT_BATCH_SIZE: usize = 100;

/// One paragraph's embedding plus the metadata stored alongside it
#[derive(Debug, Clone)]
pub struct ParagraphRecord {
    /// `{document_id}_{paragraph_index}`; re-indexing the same pair overwrites
    pub id: String,
    pub document_id: String,
    pub paragraph_index: usize,
    pub text: String,
    pub vector: Vec<f32>,
}

impl ParagraphRecord {
    /// Create a record with the derived identifier
    pub fn new(
        document_id: &str,
        paragraph_index: usize,
        text: impl Into<String>,
        vector: Vec<f32>,
    ) -> Self {
        Self {
            id: format!("{document_id}_{paragraph_index}"),
            document_id: document_id.to_string(),
            paragraph_index,
            text: text.into(),
            vector,
        }
    }
}

/// A similarity query scoped to one document; never persisted
#[derive(Debug, Clone)]
pub struct ParagraphQuery {
    pub document_id: String,
    pub vector: Vec<f32>,
    pub top_k: usize,
}

/// A transient query result, consumed to extract the stored text
#[derive(Debug, Clone)]
pub struct ParagraphMatch {
    pub document_id: String,
    pub paragraph_index: usize,
    pub text: String,
    pub score: f32,
}

/// Trait for vector database operations
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert-or-overwrite a batch of records by identifier
    async fn upsert(&self, records: Vec<ParagraphRecord>) -> Result<()>;

    /// Top-k similarity search filtered to one document, best match first
    async fn query(&self, query: ParagraphQuery) -> Result<Vec<ParagraphMatch>>;
}
