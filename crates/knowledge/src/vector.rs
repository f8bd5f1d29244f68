//! Vector similarity utilities.
//!
//! Pure-Rust implementations of:
//! - Cosine similarity and distance
//! - Exhaustive k-nearest-neighbour ranking over stored records
//! - Upsert-by-id merging

use cityguide_core::knowledge::{CollectionQueryResult, StoredRecord};

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Cosine distance: `1 - cosine_similarity`, in [0, 2]. Smaller is nearer.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// The `k` records nearest to `query`, nearest first.
///
/// Ties keep insertion order.
pub fn nearest(records: &[StoredRecord], query: &[f32], k: usize) -> CollectionQueryResult {
    let mut scored: Vec<(f32, &StoredRecord)> = records
        .iter()
        .map(|r| (cosine_distance(&r.embedding, query), r))
        .collect();

    scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);

    let mut result = CollectionQueryResult::default();
    for (distance, record) in scored {
        result.ids.push(record.id.clone());
        result.documents.push(record.document.clone());
        result.metadatas.push(record.metadata.clone());
        result.distances.push(distance);
    }
    result
}

/// Merge `incoming` into `existing`, replacing records with the same id in
/// place and appending new ones. Returns how many records were written.
pub(crate) fn upsert_by_id(existing: &mut Vec<StoredRecord>, incoming: Vec<StoredRecord>) -> usize {
    let written = incoming.len();
    for record in incoming {
        match existing.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => *slot = record,
            None => existing.push(record),
        }
    }
    written
}
