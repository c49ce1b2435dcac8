//! Open-Meteo client: city-name geocoding and current-weather fetches.
//! Free, no API key required.

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::types::{Location, WeatherSnapshot};

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";
const FORECAST_URL: &str = "https://api.open-meteo.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Weather API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeatherRaw>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherRaw {
    temperature: f64,
    windspeed: f64,
    winddirection: i32,
    time: Option<String>,
}

/// HTTP client for the Open-Meteo geocoding and forecast services.
#[derive(Debug, Clone)]
pub struct WeatherApi {
    client: Arc<Client>,
    geocoding_url: String,
    forecast_url: String,
}

impl WeatherApi {
    pub fn new() -> Result<Self, ApiError> {
        Self::with_endpoints(GEOCODING_URL, FORECAST_URL)
    }

    /// Build a client against custom endpoints (config override, tests).
    pub fn with_endpoints(
        geocoding_url: impl Into<String>,
        forecast_url: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            geocoding_url: geocoding_url.into(),
            forecast_url: forecast_url.into(),
        })
    }

    /// Resolve a city name to a location. Returns `Ok(None)` when the
    /// geocoder knows no such place.
    pub async fn geocode(&self, name: &str) -> Result<Option<Location>, ApiError> {
        let url = format!("{}/v1/search", self.geocoding_url);
        let response = self
            .client
            .get(&url)
            .query(&[("name", name), ("count", "1"), ("language", "en")])
            .send()
            .await?
            .error_for_status()?;

        let body: GeocodingResponse = response.json().await?;
        let Some(first) = body.results.and_then(|mut r| {
            if r.is_empty() {
                None
            } else {
                Some(r.remove(0))
            }
        }) else {
            tracing::debug!(city = name, "geocoder returned no results");
            return Ok(None);
        };

        Ok(Some(Location {
            name: Some(first.name),
            country: first.country,
            region: first.admin1,
            latitude: first.latitude,
            longitude: first.longitude,
        }))
    }

    /// Fetch current weather for a coordinate pair.
    pub async fn fetch_weather(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot, ApiError> {
        let url = format!("{}/v1/forecast", self.forecast_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("current_weather", "true".to_string()),
                ("timezone", "UTC".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let raw: serde_json::Value = response.json().await?;
        let parsed: ForecastResponse = serde_json::from_value(raw.clone())
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        let current = parsed
            .current_weather
            .ok_or_else(|| ApiError::Parse("response has no current_weather block".to_string()))?;

        let observed_at = current
            .time
            .as_deref()
            .and_then(parse_observation_time)
            .unwrap_or_else(Utc::now);

        Ok(WeatherSnapshot {
            temperature: current.temperature,
            windspeed: current.windspeed,
            wind_direction: current.winddirection,
            observed_at,
            raw,
        })
    }
}

/// Open-Meteo timestamps are minute-resolution ISO strings; with
/// `timezone=UTC` requested they carry no offset suffix.
fn parse_observation_time(time: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}
