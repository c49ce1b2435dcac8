//! Weather data access for Skycast
//!
//! Domain types plus the Open-Meteo client used for geocoding city names
//! and fetching current weather by coordinates.

pub mod provider;
pub mod types;

pub use provider::{ApiError, WeatherApi};
pub use types::*;
