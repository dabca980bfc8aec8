//! Error types for configuration and export operations.
//!
//! Provides a unified error type covering file I/O and the three
//! serialization formats.

use thiserror::Error;

/// Errors that can occur while loading configuration or rendering exports.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// CSV serialization failure.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// CSV writer could not be flushed into a string.
    #[error("CSV output was not valid UTF-8")]
    CsvEncoding,
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
