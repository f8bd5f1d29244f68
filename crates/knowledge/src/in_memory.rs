//! In-memory collection: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use cityguide_core::error::StoreError;
use cityguide_core::knowledge::{CollectionQueryResult, StoredRecord, VectorCollection};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::vector::{nearest, upsert_by_id};

/// A vector collection held in a Vec.
/// Useful for testing and sessions where persistence isn't needed.
pub struct InMemoryCollection {
    name: String,
    records: Arc<RwLock<Vec<StoredRecord>>>,
}

impl InMemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

#[async_trait]
impl VectorCollection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upsert(&self, records: Vec<StoredRecord>) -> Result<usize, StoreError> {
        let mut stored = self.records.write().await;
        Ok(upsert_by_id(&mut stored, records))
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<CollectionQueryResult, StoreError> {
        let stored = self.records.read().await;
        Ok(nearest(&stored, embedding, k))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }

    async fn reset(&self) -> Result<(), StoreError> {
        self.records.write().await.clear();
        Ok(())
    }
}
