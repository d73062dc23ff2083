//! Error types for flakestat.

use thiserror::Error;

/// Default result type for flakestat.
pub type FlakestatResult<T> = Result<T, FlakestatError>;

/// Errors that can occur in flakestat.
#[derive(Error, Debug)]
pub enum FlakestatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Failed to encode cache entry: {0}")]
    CacheEncode(#[from] rmp_serde::encode::Error),

    #[error("Invalid cache key '{0}': {1}")]
    InvalidCacheKey(String, String),

    #[error("No cache entry named '{0}'")]
    CacheMiss(String),

    #[error("Cache entry '{0}' is corrupt: {1}")]
    CorruptCache(String, String),

    #[error("Unknown outcome label '{0}' (expected TP, FP, FN or TN)")]
    UnknownOutcome(String),

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error("Table error: {0}")]
    Table(String),

    #[error("Plot error: {0}")]
    Plot(String),
}

impl FlakestatError {
    /// Creates a configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a table error.
    pub fn table<S: Into<String>>(msg: S) -> Self {
        Self::Table(msg.into())
    }

    /// Creates a plot error.
    pub fn plot<S: Into<String>>(msg: S) -> Self {
        Self::Plot(msg.into())
    }
}
