//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>s, <number>m, or <number>m<number>s (e.g., 30s, 1m, 2m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when a stored status value cannot be decoded.
///
/// Statuses are persisted as text; an unknown value is a classified
/// decoding failure, never a panicking conversion.
#[derive(Debug, Clone, Error)]
#[error("Unknown memo status: \"{value}\". Valid values are: NOT_STARTED, PROCESSING, COMPLETED, ERROR, FALLBACK")]
pub struct StatusDecodeError {
    pub value: String,
}

/// Error when a memo filename does not match the expected convention
#[derive(Debug, Clone, Error)]
#[error("Filename \"{input}\" does not match VN_<date>_<time>_<lat>_<lon>.<ext>")]
pub struct FilenameParseError {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
