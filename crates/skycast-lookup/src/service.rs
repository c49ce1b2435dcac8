//! The lookup orchestrator.
//!
//! One lookup runs: normalize to a cache key, consult the cache, on a miss
//! resolve and fetch live, write the fresh result back, and append a history
//! record tagged with its source. Failures are never cached and never
//! recorded. Storage problems never suppress a result already in hand: read
//! errors degrade to a miss, write errors surface as warnings.

use serde::Serialize;

use skycast_store::{
    CacheStore, HistoryRecord, HistoryStore, NewHistoryRecord, Statistics, StoreError,
};
use skycast_weather::{Location, LookupResult, Source, WeatherApi};

use crate::keys::{city_key, coords_key};

/// What a lookup hands back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct LookupOutcome {
    pub source: Source,
    pub result: LookupResult,
    /// Non-fatal storage problems encountered along the way.
    pub warnings: Vec<String>,
}

impl LookupOutcome {
    fn failure(reason: impl Into<String>) -> Self {
        Self {
            source: Source::Api,
            result: LookupResult::Failure {
                reason: reason.into(),
            },
            warnings: Vec::new(),
        }
    }
}

/// Coordinates cache, live fetch, and history logging for one request.
///
/// Both stores are injected; a fresh pair per test gives full isolation.
pub struct LookupService {
    api: WeatherApi,
    cache: Box<dyn CacheStore>,
    history: HistoryStore,
}

impl LookupService {
    pub fn new(api: WeatherApi, cache: Box<dyn CacheStore>, history: HistoryStore) -> Self {
        Self {
            api,
            cache,
            history,
        }
    }

    /// Look up current weather for a city name.
    pub async fn lookup_by_city(&self, name: &str) -> LookupOutcome {
        let key = city_key(name);
        if let Some(result) = self.read_cache(&key) {
            return self.serve(Source::Cache, result);
        }

        // Geocode with the display-preserving name, not the normalized key
        let location = match self.api.geocode(name).await {
            Ok(Some(location)) => location,
            Ok(None) => {
                tracing::info!(city = name, "location not found");
                return LookupOutcome::failure("location not found");
            }
            Err(e) => return LookupOutcome::failure(format!("network error: {e}")),
        };

        let weather = match self
            .api
            .fetch_weather(location.latitude, location.longitude)
            .await
        {
            Ok(weather) => weather,
            Err(e) => return LookupOutcome::failure(format!("network error: {e}")),
        };

        let result = LookupResult::Success {
            location: Some(location),
            weather,
        };
        self.store_and_serve(&key, result)
    }

    /// Look up current weather for a coordinate pair. No geocoding; the
    /// result's location carries only the coordinates.
    pub async fn lookup_by_coords(&self, lat: f64, lon: f64) -> LookupOutcome {
        let key = coords_key(lat, lon);
        if let Some(result) = self.read_cache(&key) {
            return self.serve(Source::Cache, result);
        }

        let weather = match self.api.fetch_weather(lat, lon).await {
            Ok(weather) => weather,
            Err(e) => return LookupOutcome::failure(format!("network error: {e}")),
        };

        let result = LookupResult::Success {
            location: Some(Location::from_coordinates(lat, lon)),
            weather,
        };
        self.store_and_serve(&key, result)
    }

    /// Up to `limit` most recent history records, newest first.
    pub fn recent_history(&self, limit: u32) -> Result<Vec<HistoryRecord>, StoreError> {
        self.history.recent(limit)
    }

    /// Aggregates over the full history ledger.
    pub fn statistics(&self) -> Result<Statistics, StoreError> {
        self.history.statistics()
    }

    /// Administrative: delete the whole history ledger.
    pub fn clear_history(&self) -> Result<usize, StoreError> {
        self.history.clear()
    }

    /// Cache read with read-path degradation: an I/O error is a miss.
    fn read_cache(&self, key: &str) -> Option<LookupResult> {
        match self.cache.read(key) {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Fresh result: write through to the cache, then serve.
    fn store_and_serve(&self, key: &str, result: LookupResult) -> LookupOutcome {
        let mut warnings = Vec::new();
        if let Err(e) = self.cache.write(key, &result) {
            tracing::warn!(key, error = %e, "cache write failed");
            warnings.push(format!("cache write failed: {e}"));
        }
        let mut outcome = self.serve(Source::Api, result);
        warnings.append(&mut outcome.warnings);
        outcome.warnings = warnings;
        outcome
    }

    /// Record the success to history and hand the result back.
    fn serve(&self, source: Source, result: LookupResult) -> LookupOutcome {
        let mut warnings = Vec::new();
        if let Some(record) = extract_record(&result, source) {
            if let Err(e) = self.history.append(record) {
                tracing::warn!(error = %e, "history append failed");
                warnings.push(format!("history write failed: {e}"));
            }
        }
        LookupOutcome {
            source,
            result,
            warnings,
        }
    }
}

/// Flatten a successful result into ledger fields. Failures produce nothing.
fn extract_record(result: &LookupResult, source: Source) -> Option<NewHistoryRecord> {
    let LookupResult::Success { location, weather } = result else {
        return None;
    };
    Some(NewHistoryRecord {
        city: location.as_ref().and_then(|l| l.name.clone()),
        latitude: location.as_ref().map(|l| l.latitude),
        longitude: location.as_ref().map(|l| l.longitude),
        temperature: Some(weather.temperature),
        windspeed: Some(weather.windspeed),
        wind_direction: Some(weather.wind_direction),
        source,
        raw_payload: Some(weather.raw.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use skycast_weather::WeatherSnapshot;

    fn success(city: Option<&str>) -> LookupResult {
        LookupResult::Success {
            location: Some(Location {
                name: city.map(String::from),
                country: None,
                region: None,
                latitude: 55.75,
                longitude: 37.62,
            }),
            weather: WeatherSnapshot {
                temperature: 15.0,
                windspeed: 5.0,
                wind_direction: 180,
                observed_at: Utc::now(),
                raw: serde_json::json!({}),
            },
        }
    }

    #[test]
    fn test_extract_record_from_success() {
        let record = extract_record(&success(Some("Moscow")), Source::Cache).unwrap();
        assert_eq!(record.city.as_deref(), Some("Moscow"));
        assert_eq!(record.latitude, Some(55.75));
        assert_eq!(record.temperature, Some(15.0));
        assert_eq!(record.source, Source::Cache);
    }

    #[test]
    fn test_extract_record_nameless_location() {
        let record = extract_record(&success(None), Source::Api).unwrap();
        assert!(record.city.is_none());
        assert_eq!(record.longitude, Some(37.62));
    }

    #[test]
    fn test_extract_record_failure_is_none() {
        let failure = LookupResult::Failure {
            reason: "location not found".to_string(),
        };
        assert!(extract_record(&failure, Source::Api).is_none());
    }
}
