//! `cityguide ingest`: Build or refresh the knowledge base from CSV.

use cityguide_core::error::IngestError;
use std::path::PathBuf;
use tracing::info;

use super::{CommandResult, build_provider, load_config, open_store, service_failure};

pub async fn run(csv: Option<PathBuf>, force_rebuild: bool) -> CommandResult<()> {
    let config = load_config()?;
    let provider = build_provider(&config)?;
    let store = open_store(&config, provider)?;
    let csv_path = csv.unwrap_or_else(|| config.knowledge.csv_path.clone());

    info!(csv = %csv_path.display(), force_rebuild, "Ingesting knowledge base");
    match store.ingest_csv(&csv_path, force_rebuild).await {
        Ok(indexed) => {
            println!("Knowledge base ready: {indexed} rows indexed.");
            match store.count().await {
                Ok(total) => println!("  Collection: {} ({total} records)", config.knowledge.collection),
                Err(e) => eprintln!("{}", service_failure("count records", &e)),
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", failure_message(&e));
            std::process::exit(1);
        }
    }
}

/// Dataset problems are shown as-is; store and embedding failures are not.
fn failure_message(error: &IngestError) -> String {
    match error {
        IngestError::Store(inner) => service_failure("ingest", inner).to_string(),
        other => other.to_string(),
    }
}
