//! `cityguide plan`: A one-day itinerary straight from the knowledge base,
//! without a generation call.

use cityguide_tools::{Budget, PreferenceTag, TripPlanner};
use std::sync::Arc;

use super::{CommandResult, build_provider, load_config, open_store, service_failure};

pub async fn run(budget: Budget, prefs: Vec<PreferenceTag>) -> CommandResult<()> {
    let config = load_config()?;
    let provider = build_provider(&config)?;
    let store = open_store(&config, provider)?;

    let planner = TripPlanner::new(Arc::new(store));
    match planner.plan(&config.city.name, budget, &prefs).await {
        Ok(itinerary) => {
            println!("{}", serde_json::to_string_pretty(&itinerary)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", service_failure("plan", &e));
            std::process::exit(1);
        }
    }
}
