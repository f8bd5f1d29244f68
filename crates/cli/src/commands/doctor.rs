//! `cityguide doctor`: Diagnose configuration and knowledge base.

use cityguide_config::AppConfig;
use cityguide_core::{Provider, VectorCollection};
use cityguide_knowledge::FileStore;
use cityguide_providers::OpenAiCompatProvider;
use tracing::warn;

use super::{CommandResult, service_failure};

pub async fn run() -> CommandResult<()> {
    println!("🩺 CityGuide Doctor — System Diagnostics");
    println!("=======================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found: {}", config_path.display());
    } else {
        println!("  ⚠️  No config file, using defaults (run `cityguide onboard`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  Fix the configuration before running other checks.");
            return Ok(());
        }
    };

    println!("     City:  {}", config.city.name);
    println!("     Model: {} (embeddings: {})", config.provider.model, config.provider.embed_model);

    if config.has_api_key() {
        println!("  ✅ API key configured");
        if !provider_reachable(&config).await {
            issues += 1;
        }
    } else {
        println!("  ❌ No API key — set API_GATEWAY_KEY or OPENAI_API_KEY");
        issues += 1;
    }

    let csv_path = &config.knowledge.csv_path;
    if csv_path.exists() {
        println!("  ✅ Dataset found: {}", csv_path.display());
    } else {
        println!("  ⚠️  Dataset missing: {}", csv_path.display());
        issues += 1;
    }

    let store = FileStore::new(&config.knowledge.store_dir);
    if store.collection_path(&config.knowledge.collection).exists() {
        let collection = store
            .get_or_create_collection(&config.knowledge.collection)
            .map_err(|e| service_failure("open knowledge base", &e))?;
        let count = collection
            .count()
            .await
            .map_err(|e| service_failure("count records", &e))?;
        match count {
            0 => {
                println!("  ⚠️  Knowledge base is empty — run `cityguide ingest`");
                issues += 1;
            }
            n => println!("  ✅ Knowledge base: {n} records"),
        }
    } else {
        println!("  ⚠️  No knowledge base yet — run `cityguide ingest`");
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

/// Probe the generation endpoint with the configured credentials.
async fn provider_reachable(config: &AppConfig) -> bool {
    let base_url = &config.provider.base_url;
    let provider = match OpenAiCompatProvider::from_config(config) {
        Ok(provider) => provider,
        Err(e) => {
            warn!(error = %e, "Provider client setup failed");
            println!("  ❌ Provider client could not be created");
            return false;
        }
    };

    match provider.health_check().await {
        Ok(true) => {
            println!("  ✅ Provider reachable: {base_url}");
            true
        }
        Ok(false) => {
            println!("  ❌ Provider rejected the request: {base_url} (check the API key and auth header)");
            false
        }
        Err(e) => {
            warn!(error = %e, "Provider health check failed");
            println!("  ❌ Provider unreachable: {base_url}");
            false
        }
    }
}
