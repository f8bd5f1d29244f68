//! Retrieval store: embeds knowledge records into a vector collection and
//! answers similarity queries against it.

use async_trait::async_trait;
use cityguide_core::error::{IngestError, StoreError};
use cityguide_core::knowledge::{
    KnowledgeRecord, RetrievalHit, Retriever, StoredRecord, VectorCollection,
};
use cityguide_core::provider::{EmbeddingRequest, Provider};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::ingest::read_csv;

/// Texts per embedding request unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// A vector collection paired with the provider that embeds its documents
/// and queries.
pub struct RetrievalStore {
    collection: Arc<dyn VectorCollection>,
    embedder: Arc<dyn Provider>,
    embed_model: String,
    batch_size: usize,
}

impl RetrievalStore {
    pub fn new(
        collection: Arc<dyn VectorCollection>,
        embedder: Arc<dyn Provider>,
        embed_model: impl Into<String>,
    ) -> Self {
        Self {
            collection,
            embedder,
            embed_model: embed_model.into(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the embedding batch size (minimum 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn collection(&self) -> &Arc<dyn VectorCollection> {
        &self.collection
    }

    /// Number of records currently indexed.
    pub async fn count(&self) -> Result<usize, StoreError> {
        self.collection.count().await
    }

    /// Embed `texts`, one vector per text in input order.
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, StoreError> {
        let expected = texts.len();
        let response = self
            .embedder
            .embed(EmbeddingRequest {
                model: self.embed_model.clone(),
                inputs: texts,
            })
            .await?;

        if response.embeddings.len() != expected {
            return Err(StoreError::EmbeddingMismatch {
                expected,
                actual: response.embeddings.len(),
            });
        }
        Ok(response.embeddings)
    }

    /// Embed and upsert `records` in batches. Returns rows ingested.
    ///
    /// With `force_rebuild` the collection is emptied first, so the result
    /// is exactly `records`.
    pub async fn ingest(&self, records: Vec<KnowledgeRecord>, force_rebuild: bool) -> Result<usize, IngestError> {
        if force_rebuild {
            self.collection.reset().await?;
            info!(collection = self.collection.name(), "Collection reset for rebuild");
        }

        let total = records.len();
        let mut ingested = 0;
        let mut remaining = records.into_iter().peekable();

        while remaining.peek().is_some() {
            let batch: Vec<KnowledgeRecord> = remaining.by_ref().take(self.batch_size).collect();
            let texts = batch.iter().map(|r| r.text.clone()).collect();
            let embeddings = self.embed(texts).await?;

            let stored = batch
                .into_iter()
                .zip(embeddings)
                .map(|(record, embedding)| StoredRecord {
                    id: record.id,
                    document: record.text,
                    embedding,
                    metadata: record.metadata,
                })
                .collect();

            ingested += self.collection.upsert(stored).await?;
            debug!(ingested, total, "Ingested batch");
        }

        info!(collection = self.collection.name(), ingested, "Ingestion complete");
        Ok(ingested)
    }

    /// Load the CSV at `path` and ingest it.
    ///
    /// A missing file fails before the collection is touched. With
    /// `force_rebuild`, the reset happens before parsing, so a malformed
    /// file leaves an empty collection behind.
    pub async fn ingest_csv(&self, path: &Path, force_rebuild: bool) -> Result<usize, IngestError> {
        if !path.exists() {
            return Err(IngestError::SourceNotFound(path.to_path_buf()));
        }

        if force_rebuild {
            self.collection.reset().await?;
            info!(collection = self.collection.name(), "Collection reset for rebuild");
        }

        let records = read_csv(path)?;
        info!(path = %path.display(), rows = records.len(), "Read CSV");
        self.ingest(records, false).await
    }

    /// The `k` records most similar to `text`, nearest first.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<RetrievalHit>, StoreError> {
        if k == 0 || self.collection.count().await? == 0 {
            return Ok(Vec::new());
        }

        let mut embeddings = self.embed(vec![text.to_string()]).await?;
        let embedding = embeddings
            .pop()
            .ok_or(StoreError::EmbeddingMismatch { expected: 1, actual: 0 })?;

        let hits = self.collection.query(&embedding, k).await?.into_hits();
        debug!(k, hits = hits.len(), "Retrieval query");
        Ok(hits)
    }
}

#[async_trait]
impl Retriever for RetrievalStore {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievalHit>, StoreError> {
        self.query(query, k).await
    }
}
