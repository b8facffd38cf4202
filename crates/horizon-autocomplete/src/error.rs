//! Error types for autocomplete configuration.

use std::path::PathBuf;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading or validating options.
///
/// Event handling never fails; these only come out of setup APIs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parsing error.
    #[error("Failed to parse autocomplete options: {0}")]
    Parse(#[from] toml::de::Error),

    /// File I/O error.
    #[error("Failed to read autocomplete options '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid option value.
    #[error("Invalid value for option '{option}': {message}")]
    InvalidValue { option: String, message: String },
}

impl ConfigError {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a value error.
    pub fn invalid_value(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            option: option.into(),
            message: message.into(),
        }
    }
}
