//! Error types for configuration loading and log storage.
//!
//! Estimation itself has no failure modes; these only cover the I/O and
//! validation edges around it.

use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Log store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Log store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Log store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
