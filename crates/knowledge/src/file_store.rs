//! File-based collections: persistent JSON-lines storage.
//!
//! Each collection is one file, `<store_dir>/<collection>.jsonl`, with one
//! JSON-encoded `StoredRecord` per line (embedding included).
//!
//! Records are loaded into memory when the collection is opened and the
//! whole file is rewritten on every mutation (upsert, reset). The in-memory
//! copy only changes once the write has succeeded.

use async_trait::async_trait;
use cityguide_core::error::StoreError;
use cityguide_core::knowledge::{CollectionQueryResult, StoredRecord, VectorCollection};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::vector::{nearest, upsert_by_id};

/// A directory of named collections.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `name`.
    pub fn collection_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.jsonl"))
    }

    /// Open `name`, creating the store directory if needed.
    ///
    /// The file itself is created on the first write.
    pub fn get_or_create_collection(&self, name: &str) -> Result<FileCollection, StoreError> {
        validate_name(name)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            StoreError::Storage(format!("Failed to create store directory {}: {e}", self.dir.display()))
        })?;
        Ok(FileCollection::open(name, self.collection_path(name)))
    }
}

fn validate_name(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::Storage(format!(
            "Invalid collection name '{name}': use letters, digits, '_' or '-'"
        )))
    }
}

/// A collection persisted as JSON lines.
pub struct FileCollection {
    name: String,
    path: PathBuf,
    records: Arc<RwLock<Vec<StoredRecord>>>,
}

impl FileCollection {
    /// Open the collection at `path`.
    ///
    /// If the file exists, records are loaded from it.
    /// If the file does not exist, starts empty.
    pub fn open(name: impl Into<String>, path: PathBuf) -> Self {
        let records = Self::load_from_disk(&path);
        let name = name.into();
        debug!(collection = %name, path = %path.display(), count = records.len(), "File collection loaded");
        Self {
            name,
            path,
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load records from a JSONL file, skipping lines that fail to parse.
    fn load_from_disk(path: &Path) -> Vec<StoredRecord> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<StoredRecord>(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted collection record");
                    None
                }
            })
            .collect()
    }

    /// Write all records to disk as JSONL.
    fn flush(&self, records: &[StoredRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("Failed to create store directory: {e}"))
            })?;
        }

        let mut content = String::new();
        for record in records {
            let line = serde_json::to_string(record).map_err(|e| {
                StoreError::Storage(format!("Failed to serialize record {}: {e}", record.id))
            })?;
            content.push_str(&line);
            content.push('\n');
        }

        std::fs::write(&self.path, &content)
            .map_err(|e| StoreError::Storage(format!("Failed to write collection file: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl VectorCollection for FileCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upsert(&self, records: Vec<StoredRecord>) -> Result<usize, StoreError> {
        let mut stored = self.records.write().await;
        let mut next = stored.clone();
        let written = upsert_by_id(&mut next, records);
        self.flush(&next)?;
        *stored = next;
        Ok(written)
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<CollectionQueryResult, StoreError> {
        let stored = self.records.read().await;
        Ok(nearest(&stored, embedding, k))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }

    async fn reset(&self) -> Result<(), StoreError> {
        let mut stored = self.records.write().await;
        self.flush(&[])?;
        stored.clear();
        Ok(())
    }
}
