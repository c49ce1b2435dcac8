//! Configuration errors shared across the workspace.
//!
//! Network and storage errors live with the crates that produce them
//! (`skycast-weather` and `skycast-store`).

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine platform config directory")]
    NoConfigDir,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
