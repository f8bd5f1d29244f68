//! Error types for the CityGuide domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all CityGuide operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Knowledge store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Ingestion errors ---
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Weather errors ---
    #[error("Weather error: {0}")]
    Weather(#[from] WeatherError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(#[from] ProviderError),

    #[error("Embedding count mismatch: sent {expected} texts, got {actual} vectors")]
    EmbeddingMismatch { expected: usize, actual: usize },
}

/// Failures while loading the curated dataset into the store.
///
/// The `Display` text is what the operator sees, so each variant reads as a
/// complete sentence.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("CSV not found at {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("CSV must contain a '{0}' column.")]
    MissingColumn(String),

    #[error("Failed to read CSV: {0}")]
    Malformed(String),

    #[error("Failed to index records: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Weather request failed: {0}")]
    Network(String),

    #[error("Weather API returned status {0}")]
    Status(u16),

    #[error("Weather response missing {0}")]
    MissingData(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn ingest_error_reads_as_sentence() {
        let err = IngestError::MissingColumn("text".into());
        assert_eq!(err.to_string(), "CSV must contain a 'text' column.");

        let err = IngestError::SourceNotFound(PathBuf::from("/data/tips.csv"));
        assert_eq!(err.to_string(), "CSV not found at /data/tips.csv");
    }

    #[test]
    fn store_error_wraps_provider_failure() {
        let err: StoreError = ProviderError::Timeout("embeddings".into()).into();
        assert!(matches!(err, StoreError::EmbeddingFailed(_)));
        assert!(err.to_string().contains("embeddings"));
    }
}
