//! Error types for configuration loading and validation

use std::path::PathBuf;
use thiserror::Error;

/// Result type for config operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration loading and validation
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Unknown configuration format
    #[error("Unknown configuration format for file: {path}\nSupported formats: .yml, .yaml, .toml")]
    UnknownFormat { path: PathBuf },

    /// YAML parsing error
    #[error("Failed to parse YAML configuration ({path}): {message}")]
    YamlError { path: String, message: String },

    /// TOML parsing error
    #[error("Failed to parse TOML configuration ({path}): {message}")]
    TomlError { path: String, message: String },

    /// IO error
    #[error("Failed to read configuration file: {path}\n{source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Value out of valid range
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        value: f32,
        min: f32,
        max: f32,
    },

    /// Invalid integer value
    #[error("{field} must be > {min}, got {value}")]
    InvalidInteger {
        field: String,
        value: usize,
        min: usize,
    },

    /// Generic validation error
    #[error("Validation failed for {field}: {message}")]
    ValidationError { field: String, message: String },
}
