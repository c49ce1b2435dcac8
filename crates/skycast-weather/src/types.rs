use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a lookup result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Api,
    Cache,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Cache => "cache",
        }
    }
}

/// Geographic location.
///
/// `name` is present when the location came from geocoding a city name and
/// absent for raw-coordinate lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// A nameless location for coordinate-only lookups.
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            name: None,
            country: None,
            region: None,
            latitude,
            longitude,
        }
    }
}

/// Current weather conditions at a point in time.
///
/// `raw` keeps the full upstream response so callers that want fields we do
/// not model (forecast arrays, units) still have them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub windspeed: f64,
    pub wind_direction: i32,
    pub observed_at: DateTime<Utc>,
    pub raw: serde_json::Value,
}

/// Outcome of resolving one weather request.
///
/// This is the unit cached and recorded to history. Failures are never
/// cached and never recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LookupResult {
    Success {
        location: Option<Location>,
        weather: WeatherSnapshot,
    },
    Failure {
        reason: String,
    },
}

impl LookupResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
