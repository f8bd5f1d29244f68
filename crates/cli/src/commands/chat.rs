//! `cityguide chat`: Interactive or single-message chat mode.

use cityguide_agent::{Assistant, AssistantSettings, TurnOutcome};
use cityguide_tools::OpenMeteoProvider;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use super::{CommandResult, build_provider, load_config, open_store, service_failure};

pub async fn run(message: Option<String>) -> CommandResult<()> {
    let config = load_config()?;
    let provider = build_provider(&config)?;
    let store = open_store(&config, provider.clone())?;

    let indexed = store
        .count()
        .await
        .map_err(|e| service_failure("count records", &e))?;
    if indexed == 0 {
        warn!("Knowledge base is empty, run `cityguide ingest` first");
    }

    let weather = OpenMeteoProvider::from_config(&config.city)
        .map_err(|e| service_failure("build weather client", &e))?;
    let assistant = Assistant::new(
        provider,
        Arc::new(store),
        Arc::new(weather),
        AssistantSettings::from(&config),
    );
    let mut session = assistant.new_session();

    if let Some(msg) = message {
        eprint!("  Thinking...");
        let turn = assistant.respond(&mut session, &msg).await;
        eprint!("\r              \r");
        println!("{}", turn.reply);
        return Ok(());
    }

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        CityGuide — {:<26}║", assistant.city());
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:      {}", config.provider.model);
    println!("  Knowledge:  {indexed} records");
    println!();
    println!("  Ask about weather, attractions, transit, or a 1-day trip plan.");
    println!("  Type '/prefs' to see remembered preferences.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
            break;
        }
        if text == "/prefs" {
            println!("  {}", session.preferences.summary());
            println!();
            continue;
        }

        eprint!("  ...");
        let turn = assistant.respond(&mut session, text).await;
        eprint!("\r     \r");

        println!();
        let prefix = match turn.outcome {
            TurnOutcome::Blocked(_) => "  Guard >",
            _ => "  Assistant >",
        };
        for line in turn.reply.lines() {
            println!("{prefix} {line}");
        }
        println!();
    }

    println!();
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}
