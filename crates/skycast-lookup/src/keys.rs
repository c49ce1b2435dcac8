//! Canonical cache keys.
//!
//! The key uniquely determines request identity: two requests for the same
//! real-world place must normalize to the same key. City names are trimmed
//! and lowercased; coordinates use fixed four-decimal formatting so that
//! `55.75` and `55.7500` cannot alias to different keys.

/// Cache key for a city-name lookup.
pub fn city_key(name: &str) -> String {
    format!("city:{}", name.trim().to_lowercase())
}

/// Cache key for a coordinate lookup.
pub fn coords_key(lat: f64, lon: f64) -> String {
    format!("coords:{lat:.4},{lon:.4}")
}
