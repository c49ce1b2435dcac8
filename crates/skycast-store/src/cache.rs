//! TTL cache for lookup results.
//!
//! Two backings behind one trait: an in-process map that is lost on restart
//! and a SQLite table that survives it. Expiry is lazy; each read evicts the
//! entry it finds stale, so no background sweep is needed.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use skycast_weather::LookupResult;

/// Storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Read/write contract of the lookup cache.
///
/// `read` returns `None` for missing and expired entries alike; callers can
/// not observe which. `write` replaces any existing entry for the key and
/// stamps it with the current time.
pub trait CacheStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<LookupResult>, StoreError>;
    fn write(&self, key: &str, value: &LookupResult) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: LookupResult,
    stored_at: DateTime<Utc>,
}

fn is_fresh(stored_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    match now.signed_duration_since(stored_at).to_std() {
        Ok(age) => age < ttl,
        // stored_at in the future (clock moved); treat as fresh
        Err(_) => true,
    }
}

/// In-process cache backing. Entries do not survive a restart.
#[derive(Debug)]
pub struct MemoryCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl CacheStore for MemoryCache {
    fn read(&self, key: &str) -> Result<Option<LookupResult>, StoreError> {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get(key) else {
            return Ok(None);
        };
        if is_fresh(entry.stored_at, Utc::now(), self.ttl) {
            return Ok(Some(entry.value.clone()));
        }
        entries.remove(key);
        tracing::debug!(key, "evicted expired cache entry");
        Ok(None)
    }

    fn write(&self, key: &str, value: &LookupResult) -> Result<(), StoreError> {
        self.entries.lock().insert(
            key.to_string(),
            CacheEntry {
                value: value.clone(),
                stored_at: Utc::now(),
            },
        );
        Ok(())
    }
}

/// SQLite cache backing. Entries survive restarts.
pub struct SqliteCache {
    conn: Mutex<Connection>,
    ttl: Duration,
}

impl SqliteCache {
    /// Open or create the cache table at the given database path.
    pub fn open<P: AsRef<Path>>(path: P, ttl: Duration) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let cache = Self {
            conn: Mutex::new(conn),
            ttl,
        };
        cache.init_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache (for testing).
    pub fn in_memory(ttl: Duration) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let cache = Self {
            conn: Mutex::new(conn),
            ttl,
        };
        cache.init_schema()?;
        Ok(cache)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.lock().execute_batch(
            "CREATE TABLE IF NOT EXISTS cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                stored_at INTEGER NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl CacheStore for SqliteCache {
    fn read(&self, key: &str) -> Result<Option<LookupResult>, StoreError> {
        let conn = self.conn.lock();
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT value, stored_at FROM cache WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((value, stored_ms)) = row else {
            return Ok(None);
        };

        let stored_at = DateTime::<Utc>::from_timestamp_millis(stored_ms).unwrap_or_default();
        if !is_fresh(stored_at, Utc::now(), self.ttl) {
            conn.execute("DELETE FROM cache WHERE key = ?1", params![key])?;
            tracing::debug!(key, "evicted expired cache entry");
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&value)?))
    }

    fn write(&self, key: &str, value: &LookupResult) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(value)?;
        let now = Utc::now().timestamp_millis();
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO cache (key, value, stored_at) VALUES (?1, ?2, ?3)",
            params![key, serialized, now],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use skycast_weather::{Location, WeatherSnapshot};

    fn success(temperature: f64) -> LookupResult {
        // Fixed timestamp so identical payloads compare equal
        let observed_at = DateTime::<Utc>::from_timestamp(1_756_500_000, 0).unwrap_or_default();
        LookupResult::Success {
            location: Some(Location::from_coordinates(55.75, 37.62)),
            weather: WeatherSnapshot {
                temperature,
                windspeed: 5.0,
                wind_direction: 180,
                observed_at,
                raw: serde_json::json!({}),
            },
        }
    }

    #[test]
    fn test_freshness_window() {
        let now = Utc::now();
        let ttl = Duration::from_secs(600);
        assert!(is_fresh(now - TimeDelta::seconds(599), now, ttl));
        assert!(!is_fresh(now - TimeDelta::seconds(600), now, ttl));
        assert!(!is_fresh(now - TimeDelta::seconds(601), now, ttl));
    }

    #[test]
    fn test_memory_cache_roundtrip() {
        let cache = MemoryCache::new(Duration::from_secs(600));
        assert!(cache.read("city:moscow").unwrap().is_none());

        cache.write("city:moscow", &success(15.0)).unwrap();
        let hit = cache.read("city:moscow").unwrap().unwrap();
        assert_eq!(hit, success(15.0));
    }

    #[test]
    fn test_memory_cache_expiry_evicts() {
        let cache = MemoryCache::new(Duration::ZERO);
        cache.write("city:moscow", &success(15.0)).unwrap();
        assert!(cache.read("city:moscow").unwrap().is_none());
        assert!(cache.entries.lock().is_empty());
    }

    #[test]
    fn test_memory_cache_write_replaces() {
        let cache = MemoryCache::new(Duration::from_secs(600));
        cache.write("city:moscow", &success(15.0)).unwrap();
        cache.write("city:moscow", &success(20.0)).unwrap();
        let hit = cache.read("city:moscow").unwrap().unwrap();
        assert_eq!(hit, success(20.0));
    }

    #[test]
    fn test_sqlite_cache_roundtrip() {
        let cache = SqliteCache::in_memory(Duration::from_secs(600)).unwrap();
        assert!(cache.read("coords:55.7500,37.6200").unwrap().is_none());

        cache.write("coords:55.7500,37.6200", &success(15.0)).unwrap();
        let hit = cache.read("coords:55.7500,37.6200").unwrap().unwrap();
        assert_eq!(hit, success(15.0));
    }

    #[test]
    fn test_sqlite_cache_expiry_deletes_row() {
        let cache = SqliteCache::in_memory(Duration::ZERO).unwrap();
        cache.write("city:moscow", &success(15.0)).unwrap();
        assert!(cache.read("city:moscow").unwrap().is_none());

        let count: i64 = cache
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_sqlite_cache_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");

        {
            let cache = SqliteCache::open(&path, Duration::from_secs(600)).unwrap();
            cache.write("city:moscow", &success(15.0)).unwrap();
        }

        let cache = SqliteCache::open(&path, Duration::from_secs(600)).unwrap();
        let hit = cache.read("city:moscow").unwrap().unwrap();
        assert_eq!(hit, success(15.0));
    }
}
