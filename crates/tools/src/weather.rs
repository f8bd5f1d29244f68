//! Weather lookup: today's forecast from Open-Meteo, turned into a
//! one-paragraph summary with clothing advice.
//!
//! The HTTP side sits behind [`WeatherProvider`] so the session loop can be
//! tested with a fixed forecast.

use async_trait::async_trait;
use cityguide_config::CityConfig;
use cityguide_core::error::WeatherError;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

pub const UNAVAILABLE_MESSAGE: &str = "Weather data is unavailable right now. Please try again.";

/// Today's forecast. Any field may be missing from the upstream response.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyForecast {
    pub min_c: Option<f64>,
    pub max_c: Option<f64>,
    /// Maximum precipitation probability, 0 to 100.
    pub precipitation_probability: Option<f64>,
}

/// Source of today's forecast for the configured city.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn today(&self) -> Result<DailyForecast, WeatherError>;
}

/// Open-Meteo daily forecast client.
pub struct OpenMeteoProvider {
    base_url: String,
    latitude: f64,
    longitude: f64,
    timezone: String,
    client: reqwest::Client,
}

impl OpenMeteoProvider {
    pub fn new(
        latitude: f64,
        longitude: f64,
        timezone: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: OPEN_METEO_URL.into(),
            latitude,
            longitude,
            timezone: timezone.into(),
            client,
        })
    }

    pub fn from_config(city: &CityConfig) -> Result<Self, WeatherError> {
        Self::new(
            city.latitude,
            city.longitude,
            &city.timezone,
            Duration::from_secs(city.weather_timeout_secs),
        )
    }

    /// Point at a different forecast endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            (
                "daily",
                "temperature_2m_max,temperature_2m_min,precipitation_probability_max".into(),
            ),
            ("timezone", self.timezone.clone()),
            ("forecast_days", "1".into()),
        ]
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn today(&self) -> Result<DailyForecast, WeatherError> {
        debug!(latitude = self.latitude, longitude = self.longitude, "Requesting forecast");

        let response = self
            .client
            .get(&self.base_url)
            .query(&self.query_params())
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Network(format!("Failed to parse forecast: {e}")))?;

        Ok(body.into_forecast())
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    daily: Option<DailyBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
}

impl ForecastResponse {
    fn into_forecast(self) -> DailyForecast {
        let daily = self.daily.unwrap_or_default();
        let first = |values: &[Option<f64>]| values.first().copied().flatten();
        DailyForecast {
            min_c: first(&daily.temperature_2m_min),
            max_c: first(&daily.temperature_2m_max),
            precipitation_probability: first(&daily.precipitation_probability_max),
        }
    }
}

/// Clothing and rain advice for an average temperature and rain chance.
pub fn clothing_advice(avg_temp_c: f64, precip_prob: f64) -> String {
    let temperature = if avg_temp_c <= 0.0 {
        "Very cold: wear a heavy coat, gloves, and a hat."
    } else if avg_temp_c <= 10.0 {
        "Chilly: a warm jacket and long pants are recommended."
    } else if avg_temp_c <= 20.0 {
        "Mild: a light jacket or hoodie should be fine."
    } else {
        "Warm: a t-shirt or light long-sleeve is usually enough."
    };

    let rain = if precip_prob >= 60.0 {
        "High rain chance: bring an umbrella or waterproof jacket."
    } else if precip_prob >= 25.0 {
        "Possible light rain: consider a small umbrella."
    } else {
        "Low rain chance: great for outdoor activities."
    };

    format!("{temperature} {rain}")
}

/// Render a forecast as the reply text.
///
/// Missing temperatures produce the unavailable message; a missing rain
/// probability counts as 0%.
pub fn format_summary(city: &str, forecast: &DailyForecast) -> String {
    let (Some(min), Some(max)) = (forecast.min_c, forecast.max_c) else {
        return UNAVAILABLE_MESSAGE.to_string();
    };
    let precip = forecast.precipitation_probability.unwrap_or(0.0);
    let advice = clothing_advice((min + max) / 2.0, precip);

    format!(
        "{city} weather today: {min:.0}°C to {max:.0}°C, \
         max precipitation probability about {precip:.0}%. {advice}"
    )
}

/// Weather lookup for the configured city.
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    city: String,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>, city: impl Into<String>) -> Self {
        Self {
            provider,
            city: city.into(),
        }
    }

    /// Today's summary for the city.
    pub async fn summary(&self) -> Result<String, WeatherError> {
        let forecast = self.provider.today().await?;
        Ok(format_summary(&self.city, &forecast))
    }
}
