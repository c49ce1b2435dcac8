//! Append-only ledger of resolved lookups.
//!
//! Every successful lookup lands here exactly once, whether it was served
//! from cache or fetched live; the `source` tag tells them apart. Records
//! are never mutated. The only deletion is the administrative `clear`.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

use skycast_weather::Source;

use crate::cache::StoreError;

/// One recorded lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub temperature: Option<f64>,
    pub windspeed: Option<f64>,
    pub wind_direction: Option<i32>,
    pub source: Source,
    pub requested_at: DateTime<Utc>,
    pub raw_payload: Option<serde_json::Value>,
}

/// Fields of a record about to be appended; id and timestamp are assigned
/// by the store.
#[derive(Debug, Clone)]
pub struct NewHistoryRecord {
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub temperature: Option<f64>,
    pub windspeed: Option<f64>,
    pub wind_direction: Option<i32>,
    pub source: Source,
    pub raw_payload: Option<serde_json::Value>,
}

/// Temperature aggregates over the ledger. Absent entirely when no record
/// carries a temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureStats {
    /// Mean, rounded to one decimal place.
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

/// Aggregates computed over the full ledger at call time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_requests: u64,
    /// Distinct non-null city names.
    pub unique_locations: u64,
    pub temperature: Option<TemperatureStats>,
}

/// SQLite-backed history ledger.
pub struct HistoryStore {
    conn: Mutex<Connection>,
}

impl HistoryStore {
    /// Open or create the ledger at the given database path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory ledger (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.lock().execute_batch(
            "CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                city TEXT,
                latitude REAL,
                longitude REAL,
                temperature REAL,
                windspeed REAL,
                wind_direction INTEGER,
                source TEXT NOT NULL,
                requested_at INTEGER NOT NULL,
                raw_payload TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_history_requested ON history(requested_at);",
        )?;
        Ok(())
    }

    /// Append one record, stamping it with the current time. Returns the
    /// assigned id.
    pub fn append(&self, record: NewHistoryRecord) -> Result<i64, StoreError> {
        let raw_payload = record
            .raw_payload
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let now = Utc::now().timestamp_millis();

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO history
             (city, latitude, longitude, temperature, windspeed, wind_direction, source, requested_at, raw_payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.city,
                record.latitude,
                record.longitude,
                record.temperature,
                record.windspeed,
                record.wind_direction,
                record.source.as_str(),
                now,
                raw_payload,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Up to `limit` most recent records, newest first.
    pub fn recent(&self, limit: u32) -> Result<Vec<HistoryRecord>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, city, latitude, longitude, temperature, windspeed, wind_direction,
                    source, requested_at, raw_payload
             FROM history
             ORDER BY requested_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], row_to_record)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Aggregates over the full ledger.
    pub fn statistics(&self) -> Result<Statistics, StoreError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT city),
                    AVG(temperature), MIN(temperature), MAX(temperature)
             FROM history",
            [],
            |row| {
                let total: i64 = row.get(0)?;
                let unique: i64 = row.get(1)?;
                let avg: Option<f64> = row.get(2)?;
                let min: Option<f64> = row.get(3)?;
                let max: Option<f64> = row.get(4)?;

                let temperature = match (avg, min, max) {
                    (Some(average), Some(min), Some(max)) => Some(TemperatureStats {
                        average: (average * 10.0).round() / 10.0,
                        min,
                        max,
                    }),
                    _ => None,
                };

                Ok(Statistics {
                    total_requests: total as u64,
                    unique_locations: unique as u64,
                    temperature,
                })
            },
        )
        .map_err(StoreError::from)
    }

    /// Delete all records. Administrative only; never part of a lookup.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let deleted = self.conn.lock().execute("DELETE FROM history", [])?;
        tracing::info!(deleted, "history cleared");
        Ok(deleted)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<HistoryRecord> {
    let source: String = row.get(7)?;
    let requested_ms: i64 = row.get(8)?;
    let raw_payload: Option<String> = row.get(9)?;
    Ok(HistoryRecord {
        id: row.get(0)?,
        city: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
        temperature: row.get(4)?,
        windspeed: row.get(5)?,
        wind_direction: row.get(6)?,
        source: match source.as_str() {
            "cache" => Source::Cache,
            "api" => Source::Api,
            other => {
                tracing::warn!(source = other, "unknown source tag, decoding as api");
                Source::Api
            }
        },
        requested_at: DateTime::<Utc>::from_timestamp_millis(requested_ms).unwrap_or_default(),
        raw_payload: raw_payload.and_then(|p| serde_json::from_str(&p).ok()),
    })
}
