//! `cityguide weather`: Today's forecast summary for the configured city.

use cityguide_core::error::WeatherError;
use cityguide_tools::weather::UNAVAILABLE_MESSAGE;
use cityguide_tools::{OpenMeteoProvider, WeatherService};
use std::sync::Arc;
use tracing::warn;

use super::{CommandResult, load_config};

pub async fn run() -> CommandResult<()> {
    let config = load_config()?;
    let summary = match OpenMeteoProvider::from_config(&config.city) {
        Ok(provider) => WeatherService::new(Arc::new(provider), &config.city.name).summary().await,
        Err(e) => Err(e),
    };

    println!("{}", report(summary));
    Ok(())
}

/// The summary, or the fixed unavailable text when the lookup failed.
fn report(summary: Result<String, WeatherError>) -> String {
    summary.unwrap_or_else(|e| {
        warn!(error = %e, "Weather lookup failed");
        UNAVAILABLE_MESSAGE.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_lookup_prints_fixed_message() {
        let err = WeatherError::Network(
            "error sending request for url (https://api.open-meteo.com/v1/forecast?latitude=43.6532)".into(),
        );
        let shown = report(Err(err));
        assert_eq!(shown, UNAVAILABLE_MESSAGE);
        assert!(!shown.contains("open-meteo"));
    }

    #[test]
    fn bad_status_prints_fixed_message() {
        assert_eq!(report(Err(WeatherError::Status(503))), UNAVAILABLE_MESSAGE);
    }

    #[test]
    fn summary_passes_through() {
        assert_eq!(report(Ok("Toronto weather today".into())), "Toronto weather today");
    }
}
