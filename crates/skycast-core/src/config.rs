use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// How long a cached lookup stays fresh. Weather data goes stale quickly,
/// so anything between 5 and 30 minutes is sensible.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// Which backing the cache store uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-process map; entries are lost on restart.
    Memory,
    /// Local SQLite table; entries survive restarts.
    #[default]
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the SQLite database files.
    pub data_dir: PathBuf,

    /// Cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Upstream API endpoints
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds a cache entry stays fresh.
    pub ttl_secs: u64,
    /// Cache backing store.
    pub backend: CacheBackend,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            backend: CacheBackend::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Open-Meteo geocoding search endpoint.
    pub geocoding_url: String,
    /// Open-Meteo forecast endpoint.
    pub forecast_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com".to_string(),
            forecast_url: "https://api.open-meteo.com".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the platform config directory, falling back
    /// to defaults when no config file exists yet.
    pub fn load() -> Result<Self> {
        let Some(config_dir) = dirs::config_dir() else {
            return Err(ConfigError::NoConfigDir.into());
        };
        let path = config_dir.join("skycast").join("config.toml");

        if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: Config = toml::from_str(&raw)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Non-fatal sanity checks, returned as human-readable warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.cache.ttl_secs < 300 || self.cache.ttl_secs > 1800 {
            warnings.push(format!(
                "cache.ttl_secs = {} is outside the recommended 300-1800 range",
                self.cache.ttl_secs
            ));
        }
        if self.api.geocoding_url.is_empty() || self.api.forecast_url.is_empty() {
            warnings.push("api endpoint URLs must not be empty".to_string());
        }
        warnings
    }

    /// Path of the SQLite database holding cache and history tables.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("skycast.db")
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skycast");
        Self {
            data_dir,
            cache: CacheConfig::default(),
            api: ApiConfig::default(),
        }
    }
}
