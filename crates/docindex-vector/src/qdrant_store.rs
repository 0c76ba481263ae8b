//! Qdrant implementation for vector storage
//!
//! Provides connection management and vector operations
//! for paragraph embeddings.

use std::collections::HashMap;

use async_trait::async_trait;
use docindex_core::{DocIndexError, Result, VectorDbConfig};
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, Distance, Filter, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Qdrant vector store implementation
pub struct QdrantStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantStore {
    /// Connect and ensure the collection exists.
    ///
    /// Failures here are fatal to startup; callers should not defer them to
    /// the first request.
    pub async fn connect(config: &VectorDbConfig) -> Result<Self> {
        let client = Qdrant::from_url(&config.url)
            .api_key(config.api_key.clone())
            .build()
            .map_err(|e| DocIndexError::VectorDb(format!("Qdrant connection failed: {e}")))?;

        let store = Self {
            client,
            collection: config.collection.clone(),
            dimension: config.dimension,
        };
        store.init_collection().await?;

        Ok(store)
    }

    /// Create the collection with cosine distance if it is absent
    async fn init_collection(&self) -> Result<()> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| DocIndexError::VectorDb(format!("Failed to list collections: {e}")))?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if !exists {
            tracing::info!("Creating collection {}", self.collection);
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(
                        VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                    ),
                )
                .await
                .map_err(|e| {
                    DocIndexError::VectorDb(format!("Failed to create collection: {e}"))
                })?;
        }

        Ok(())
    }
}

/// Payload stored with each vector
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ParagraphPayload {
    document_id: String,
    paragraph_index: usize,
    text: String,
}

/// Qdrant only accepts integer or UUID point identifiers, so the record id
/// string maps to a deterministic UUID. Determinism keeps an upsert for the
/// same (document, paragraph) pair overwriting the same point.
fn point_id(record_id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, record_id.as_bytes()).to_string()
}

#[async_trait]
impl super::VectorStore for QdrantStore {
    async fn upsert(&self, records: Vec<super::ParagraphRecord>) -> Result<()> {
        let points: Vec<PointStruct> = records
            .into_iter()
            .map(|record| {
                let payload = ParagraphPayload {
                    document_id: record.document_id,
                    paragraph_index: record.paragraph_index,
                    text: record.text,
                };

                let payload_map: HashMap<String, qdrant_client::qdrant::Value> =
                    serde_json::to_value(&payload)
                        .unwrap_or_default()
                        .as_object()
                        .cloned()
                        .unwrap_or_default()
                        .into_iter()
                        .map(|(k, v)| (k, v.into()))
                        .collect();

                PointStruct::new(point_id(&record.id), record.vector, payload_map)
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points))
            .await
            .map_err(|e| DocIndexError::VectorDb(format!("Failed to upsert vectors: {e}")))?;

        Ok(())
    }

    async fn query(&self, query: super::ParagraphQuery) -> Result<Vec<super::ParagraphMatch>> {
        let filter = Filter::must([Condition::matches(
            "document_id",
            query.document_id.clone(),
        )]);

        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query.vector, query.top_k as u64)
                    .filter(filter)
                    .with_payload(true),
            )
            .await
            .map_err(|e| DocIndexError::VectorDb(format!("Vector search failed: {e}")))?;

        let matches = results
            .result
            .into_iter()
            .map(|point| {
                let payload = point.payload;

                let document_id = payload
                    .get("document_id")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
                    .unwrap_or_default();

                let paragraph_index = payload
                    .get("paragraph_index")
                    .and_then(|v| match &v.kind {
                        Some(Kind::IntegerValue(i)) => Some(*i as usize),
                        _ => None,
                    })
                    .unwrap_or_default();

                let text = payload
                    .get("text")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
                    .unwrap_or_default();

                super::ParagraphMatch {
                    document_id,
                    paragraph_index,
                    text,
                    score: point.score,
                }
            })
            .collect();

        Ok(matches)
    }
}
