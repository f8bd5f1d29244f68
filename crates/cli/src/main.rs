//! CityGuide CLI: the main entry point.
//!
//! Commands:
//! - `onboard`: Write the default config and data directory
//! - `ingest`: Build or refresh the knowledge base from CSV
//! - `chat`: Interactive chat or single-message mode
//! - `weather`: Today's forecast summary
//! - `plan`: A local day-trip itinerary as JSON
//! - `doctor`: Diagnose config and knowledge base

use cityguide_tools::{Budget, PreferenceTag};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "cityguide",
    about = "CityGuide — a city tour assistant for weather, attractions and day trips",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and data directory
    Onboard,

    /// Build or refresh the knowledge base
    Ingest {
        /// CSV to index instead of the configured one
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Empty the collection before indexing
        #[arg(long)]
        force_rebuild: bool,
    },

    /// Chat with the tour assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Print today's weather summary
    Weather,

    /// Print a one-day itinerary as JSON
    Plan {
        /// low, medium or high
        #[arg(short, long, default_value = "medium")]
        budget: Budget,

        /// Comma-separated interests, e.g. museum,food
        #[arg(short, long, value_delimiter = ',')]
        prefs: Vec<PreferenceTag>,
    },

    /// Diagnose configuration and knowledge base
    Doctor,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.log_json {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let result = match cli.command {
        Commands::Onboard => commands::onboard::run().await,
        Commands::Ingest { csv, force_rebuild } => commands::ingest::run(csv, force_rebuild).await,
        Commands::Chat { message } => commands::chat::run(message).await,
        Commands::Weather => commands::weather::run().await,
        Commands::Plan { budget, prefs } => commands::plan::run(budget, prefs).await,
        Commands::Doctor => commands::doctor::run().await,
    };

    // Errors reaching here already carry user-facing text.
    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
