//! Domain error types

use thiserror::Error;

/// A duration string that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid duration \"{input}\": {reason}. Use units ms, s and m (e.g., 300ms, 30s, 1m, 2m30s)")]
pub struct DurationParseError {
    pub input: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported upload format \"{0}\". Valid formats are: wav, flac")]
pub struct InvalidUploadFormatError(pub String);

/// Configuration file and value errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Cannot access config file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Config file {path} is not valid TOML: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Cannot serialize config: {0}")]
    Serialize(String),

    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}

impl ConfigError {
    pub fn invalid_value(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}
