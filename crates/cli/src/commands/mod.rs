pub mod chat;
pub mod doctor;
pub mod ingest;
pub mod onboard;
pub mod plan;
pub mod weather;

use cityguide_agent::assistant::APOLOGY;
use cityguide_config::AppConfig;
use cityguide_core::Provider;
use cityguide_knowledge::{FileStore, RetrievalStore};
use cityguide_providers::OpenAiCompatProvider;
use std::fmt::Display;
use std::sync::Arc;
use tracing::warn;

type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Log a store or upstream failure and return the fixed text shown instead.
fn service_failure(action: &str, error: &dyn Display) -> &'static str {
    warn!(action, error = %error, "Command failed");
    APOLOGY
}

fn load_config() -> CommandResult<AppConfig> {
    AppConfig::load().map_err(|e| format!("Failed to load config: {e}").into())
}

/// The generation/embedding client. Fails before any request when no key is set.
fn build_provider(config: &AppConfig) -> CommandResult<Arc<dyn Provider>> {
    if let Err(e) = config.require_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables (or put it in .env / .secrets):");
        eprintln!("    API_GATEWAY_KEY=...   (sent as x-api-key)");
        eprintln!("    OPENAI_API_KEY=sk-... (sent as a bearer token)");
        eprintln!();
        eprintln!("  Or add api_key to {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err(e.into());
    }
    Ok(Arc::new(OpenAiCompatProvider::from_config(config)?))
}

/// The persisted knowledge base named in `[knowledge]`.
fn open_store(config: &AppConfig, embedder: Arc<dyn Provider>) -> CommandResult<RetrievalStore> {
    let store = FileStore::new(&config.knowledge.store_dir);
    let collection = store
        .get_or_create_collection(&config.knowledge.collection)
        .map_err(|e| service_failure("open knowledge base", &e))?;
    Ok(RetrievalStore::new(Arc::new(collection), embedder, &config.provider.embed_model)
        .with_batch_size(config.knowledge.batch_size))
}
