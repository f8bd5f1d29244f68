//! `cityguide onboard`: First-time setup.

use cityguide_config::AppConfig;

use super::CommandResult;

pub async fn run() -> CommandResult<()> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");
    let defaults = AppConfig::default();

    println!("CityGuide — First-Time Setup");
    println!("============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if let Some(data_dir) = defaults.knowledge.csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !data_dir.exists() {
            std::fs::create_dir_all(data_dir)?;
            println!("✅ Created data directory: {}", data_dir.display());
        }
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
    }

    println!("\n📝 Next steps:");
    println!("   1. Set API_GATEWAY_KEY or OPENAI_API_KEY (environment, .env or .secrets)");
    println!("   2. Put your dataset at {}", defaults.knowledge.csv_path.display());
    println!("   3. Run: cityguide ingest");
    println!("   4. Run: cityguide chat\n");

    Ok(())
}
