//! Local storage for Skycast
//!
//! A TTL cache for lookup results (in-memory or SQLite-backed) and the
//! append-only history ledger with derived statistics.

pub mod cache;
pub mod history;

pub use cache::{CacheStore, MemoryCache, SqliteCache, StoreError};
pub use history::{HistoryRecord, HistoryStore, NewHistoryRecord, Statistics, TemperatureStats};
