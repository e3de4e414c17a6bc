//! Error types for the conversion system.
//!
//! All errors are represented by the [`Error`] enum so that configuration,
//! parsing and per-node content failures compose across crates.

use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// The core error type for all wf2ls operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON in a source export or configuration file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Invalid configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Configuration key that no option answers to
    #[error("Property not found: {key}")]
    UnknownOption { key: String },

    /// Configuration value of the wrong JSON type
    #[error("Invalid property value type for {key}: expected {expected}")]
    InvalidOptionType { key: String, expected: String },

    /// Configuration value outside the allowed set
    #[error("Invalid option value for {key}: {value}")]
    InvalidOptionValue { key: String, value: String },

    /// Source tree could not be interpreted
    #[error("Parse error: {reason}")]
    ParseError { reason: String },

    /// Rich-text content of a single node could not be converted
    #[error("Markup error: {reason}")]
    MarkupError { reason: String },
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Error::FileNotFound { path: path.into() }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create an unknown option error
    pub fn unknown_option(key: impl Into<String>) -> Self {
        Error::UnknownOption { key: key.into() }
    }

    /// Create an invalid option type error
    pub fn invalid_option_type(key: impl Into<String>, expected: impl Into<String>) -> Self {
        Error::InvalidOptionType {
            key: key.into(),
            expected: expected.into(),
        }
    }

    /// Create an invalid option value error
    pub fn invalid_option_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Error::InvalidOptionValue {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Error::ParseError {
            reason: reason.into(),
        }
    }

    /// Create a markup error
    pub fn markup_error(reason: impl Into<String>) -> Self {
        Error::MarkupError {
            reason: reason.into(),
        }
    }

    /// Whether this error belongs to the configuration family
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::ConfigError { .. }
                | Error::UnknownOption { .. }
                | Error::InvalidOptionType { .. }
                | Error::InvalidOptionValue { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::file_not_found("/path/to/backup.json");
        assert!(err.to_string().contains("File not found"));

        let err = Error::unknown_option("notAThing");
        assert_eq!(err.to_string(), "Property not found: notAThing");
        assert!(err.is_config_error());
    }

    #[test]
    fn test_markup_error_is_not_config() {
        let err = Error::markup_error("time element without a year");
        assert!(err.to_string().starts_with("Markup error"));
        assert!(!err.is_config_error());
    }
}
