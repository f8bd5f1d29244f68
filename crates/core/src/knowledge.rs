//! Knowledge base types: curated city records and the vector collection
//! that indexes them.
//!
//! Records come from a tabular source once, get embedded, and are upserted
//! into a [`VectorCollection`]. Queries come back nearest-first as
//! [`RetrievalHit`]s through the [`Retriever`] seam, which is what the answer
//! composer and the trip planner depend on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::StoreError;

/// Named metadata columns of a knowledge record.
///
/// Every field is optional in the source and defaults to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordMetadata {
    pub name: String,
    pub category: String,
    pub neighborhood: String,
    /// Transit mode / directions (subway line, streetcar, bus).
    pub transit: String,
    /// Price tier as written in the source (`low`, `medium`, `high` or empty).
    pub price_level: String,
    pub duration_hours: String,
    /// Audience tags (family, date, solo...).
    pub best_for: String,
    pub highlights: String,
    pub tips: String,
}

/// One row of the curated dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    pub id: String,
    /// Free-text description; this is what gets embedded.
    pub text: String,
    pub metadata: RecordMetadata,
}

/// A record as persisted inside a collection, embedding included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub document: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: RecordMetadata,
}

/// Raw nearest-neighbour result: parallel lists, nearest first.
#[derive(Debug, Clone, Default)]
pub struct CollectionQueryResult {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<RecordMetadata>,
    pub distances: Vec<f32>,
}

impl CollectionQueryResult {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Zip the parallel lists into hits, preserving order.
    pub fn into_hits(self) -> Vec<RetrievalHit> {
        self.ids
            .into_iter()
            .zip(self.documents)
            .zip(self.metadatas)
            .zip(self.distances)
            .map(|(((id, text), metadata), distance)| RetrievalHit {
                id,
                text,
                metadata,
                distance,
            })
            .collect()
    }
}

/// A record returned by a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalHit {
    pub id: String,
    pub text: String,
    pub metadata: RecordMetadata,
    /// Cosine distance to the query; smaller is nearer.
    pub distance: f32,
}

/// A persistent, named collection of embedded records.
///
/// Implementations: in-memory (tests, ephemeral), JSON-lines file.
#[async_trait]
pub trait VectorCollection: Send + Sync {
    /// The collection name.
    fn name(&self) -> &str;

    /// Insert or overwrite records by id. Returns how many were written.
    async fn upsert(&self, records: Vec<StoredRecord>) -> std::result::Result<usize, StoreError>;

    /// The `k` nearest records to `embedding` by cosine distance.
    async fn query(&self, embedding: &[f32], k: usize) -> std::result::Result<CollectionQueryResult, StoreError>;

    /// Number of stored records.
    async fn count(&self) -> std::result::Result<usize, StoreError>;

    /// Drop every record, leaving an empty collection behind.
    async fn reset(&self) -> std::result::Result<(), StoreError>;
}

/// Text-in, hits-out similarity search.
///
/// An empty result is a normal outcome, not an error.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, k: usize) -> std::result::Result<Vec<RetrievalHit>, StoreError>;
}
