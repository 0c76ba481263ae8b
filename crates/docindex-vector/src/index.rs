//! Indexing and retrieval entry points
//!
//! `DocumentIndex` owns the store handle and exposes the two operations the
//! outer request-handling layer calls.

use std::sync::Arc;

use docindex_core::{DocIndexError, Result};

use crate::{ParagraphQuery, ParagraphRecord, VectorStore, TOP_K_PARAGRAPHS, UPSERT_BATCH_SIZE};

/// Entry point for indexing and retrieving paragraph embeddings.
///
/// Holds an injected store handle; cheap to clone and share across the host
/// framework's tasks.
#[derive(Clone)]
pub struct DocumentIndex {
    store: Arc<dyn VectorStore>,
}

impl DocumentIndex {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Index a document's paragraphs.
    ///
    /// `paragraphs` and `embeddings` are paired positionally; unequal lengths
    /// are rejected before anything is written. Records are submitted in
    /// batches of at most [`UPSERT_BATCH_SIZE`]; batches accepted before a
    /// failing one remain persisted (no rollback).
    pub async fn add_document(
        &self,
        document_id: &str,
        paragraphs: Vec<String>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<()> {
        if paragraphs.len() != embeddings.len() {
            return Err(DocIndexError::LengthMismatch {
                paragraphs: paragraphs.len(),
                embeddings: embeddings.len(),
            });
        }

        let records: Vec<ParagraphRecord> = paragraphs
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (text, vector))| ParagraphRecord::new(document_id, i, text, vector))
            .collect();

        tracing::debug!(
            "Indexing {} paragraphs for document {document_id}",
            records.len()
        );

        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            self.store
                .upsert(batch.to_vec())
                .await
                .map_err(|e| DocIndexError::IndexingFailed(e.to_string()))?;
        }

        Ok(())
    }

    /// Retrieve the texts of the paragraphs closest to `embedding` within one
    /// document, best match first.
    ///
    /// Returns at most [`TOP_K_PARAGRAPHS`] texts in the service's ranking
    /// order; no matches is an empty vec, not an error.
    pub async fn fetch_top_paragraphs(
        &self,
        document_id: &str,
        embedding: Vec<f32>,
    ) -> Result<Vec<String>> {
        let query = ParagraphQuery {
            document_id: document_id.to_string(),
            vector: embedding,
            top_k: TOP_K_PARAGRAPHS,
        };

        let matches = self
            .store
            .query(query)
            .await
            .map_err(|e| DocIndexError::QueryFailed(e.to_string()))?;

        tracing::debug!("Query for {document_id} returned {} matches", matches.len());

        Ok(matches.into_iter().map(|m| m.text).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParagraphMatch;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory store that records batches and queries, emulating the
    /// service-side document filter and top-k bound.
    #[derive(Default)]
    struct RecordingStore {
        batches: Mutex<Vec<Vec<ParagraphRecord>>>,
        queries: Mutex<Vec<ParagraphQuery>>,
        matches: Vec<ParagraphMatch>,
        fail_with: Option<String>,
    }

    impl RecordingStore {
        fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                ..Default::default()
            }
        }

        fn with_matches(matches: Vec<ParagraphMatch>) -> Self {
            Self {
                matches,
                ..Default::default()
            }
        }

        fn batch_sizes(&self) -> Vec<usize> {
            self.batches.lock().unwrap().iter().map(Vec::len).collect()
        }
    }

    #[async_trait]
    impl VectorStore for RecordingStore {
        async fn upsert(&self, records: Vec<ParagraphRecord>) -> docindex_core::Result<()> {
            if let Some(message) = &self.fail_with {
                return Err(DocIndexError::VectorDb(message.clone()));
            }
            self.batches.lock().unwrap().push(records);
            Ok(())
        }

        async fn query(&self, query: ParagraphQuery) -> docindex_core::Result<Vec<ParagraphMatch>> {
            if let Some(message) = &self.fail_with {
                return Err(DocIndexError::VectorDb(message.clone()));
            }
            let matches = self
                .matches
                .iter()
                .filter(|m| m.document_id == query.document_id)
                .take(query.top_k)
                .cloned()
                .collect();
            self.queries.lock().unwrap().push(query);
            Ok(matches)
        }
    }

    fn paragraph_match(document_id: &str, paragraph_index: usize, text: &str, score: f32) -> ParagraphMatch {
        ParagraphMatch {
            document_id: document_id.to_string(),
            paragraph_index,
            text: text.to_string(),
            score,
        }
    }

    #[tokio::test]
    async fn test_record_ids_follow_document_and_index() {
        let store = Arc::new(RecordingStore::default());
        let index = DocumentIndex::new(store.clone());

        index
            .add_document(
                "doc1",
                vec!["first".to_string(), "second".to_string()],
                vec![vec![0.1; 4], vec![0.2; 4]],
            )
            .await
            .unwrap();

        let batches = store.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0][0].id, "doc1_0");
        assert_eq!(batches[0][1].id, "doc1_1");
        assert_eq!(batches[0][0].text, "first");
        assert_eq!(batches[0][1].paragraph_index, 1);
    }

    #[tokio::test]
    async fn test_batches_of_at_most_one_hundred() {
        let store = Arc::new(RecordingStore::default());
        let index = DocumentIndex::new(store.clone());

        let paragraphs: Vec<String> = (0..250).map(|i| format!("paragraph {i}")).collect();
        let embeddings: Vec<Vec<f32>> = (0..250).map(|_| vec![0.0; 4]).collect();

        index
            .add_document("doc1", paragraphs, embeddings)
            .await
            .unwrap();

        assert_eq!(store.batch_sizes(), vec![100, 100, 50]);

        let batches = store.batches.lock().unwrap();
        assert_eq!(batches[2].last().unwrap().id, "doc1_249");
    }

    #[tokio::test]
    async fn test_empty_document_is_a_no_op() {
        let store = Arc::new(RecordingStore::default());
        let index = DocumentIndex::new(store.clone());

        index.add_document("doc1", vec![], vec![]).await.unwrap();

        assert!(store.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mismatched_lengths_rejected_before_writing() {
        let store = Arc::new(RecordingStore::default());
        let index = DocumentIndex::new(store.clone());

        let err = index
            .add_document(
                "doc1",
                vec!["a".to_string(), "b".to_string()],
                vec![vec![0.1; 4]],
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DocIndexError::LengthMismatch {
                paragraphs: 2,
                embeddings: 1
            }
        ));
        assert_eq!(err.status_code(), 400);
        assert!(store.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_failure_translates() {
        let store = Arc::new(RecordingStore::failing("quota exceeded"));
        let index = DocumentIndex::new(store);

        let err = index
            .add_document("doc1", vec!["a".to_string()], vec![vec![0.1; 4]])
            .await
            .unwrap_err();

        assert!(matches!(err, DocIndexError::IndexingFailed(_)));
        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(err.status_code(), 502);
    }

    #[tokio::test]
    async fn test_fetch_returns_texts_in_service_order() {
        let store = Arc::new(RecordingStore::with_matches(vec![
            paragraph_match("doc1", 2, "closest", 0.92),
            paragraph_match("doc1", 0, "second", 0.85),
            paragraph_match("doc1", 5, "third", 0.41),
        ]));
        let index = DocumentIndex::new(store.clone());

        let texts = index
            .fetch_top_paragraphs("doc1", vec![0.3; 4])
            .await
            .unwrap();

        assert_eq!(texts, vec!["closest", "second", "third"]);

        let queries = store.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].document_id, "doc1");
        assert_eq!(queries[0].top_k, 3);
    }

    #[tokio::test]
    async fn test_fetch_empty_when_no_matches() {
        let store = Arc::new(RecordingStore::default());
        let index = DocumentIndex::new(store);

        let texts = index
            .fetch_top_paragraphs("doc1", vec![0.3; 4])
            .await
            .unwrap();

        assert!(texts.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_is_scoped_to_requested_document() {
        let store = Arc::new(RecordingStore::with_matches(vec![
            paragraph_match("doc1", 0, "from doc1", 0.9),
            paragraph_match("doc2", 0, "from doc2", 0.95),
        ]));
        let index = DocumentIndex::new(store);

        let texts = index
            .fetch_top_paragraphs("doc1", vec![0.3; 4])
            .await
            .unwrap();

        assert_eq!(texts, vec!["from doc1"]);
    }

    #[tokio::test]
    async fn test_fetch_fewer_than_top_k_is_not_an_error() {
        let store = Arc::new(RecordingStore::with_matches(vec![paragraph_match(
            "doc1", 0, "only one", 0.7,
        )]));
        let index = DocumentIndex::new(store);

        let texts = index
            .fetch_top_paragraphs("doc1", vec![0.3; 4])
            .await
            .unwrap();

        assert_eq!(texts.len(), 1);
    }

    #[tokio::test]
    async fn test_query_failure_translates() {
        let store = Arc::new(RecordingStore::failing("service unavailable"));
        let index = DocumentIndex::new(store);

        let err = index
            .fetch_top_paragraphs("doc1", vec![0.3; 4])
            .await
            .unwrap_err();

        assert!(matches!(err, DocIndexError::QueryFailed(_)));
        assert!(err.to_string().contains("service unavailable"));
        assert_eq!(err.status_code(), 502);
    }
}
