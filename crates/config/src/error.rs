//! Error types for settings and the persisted state document

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration and persistence operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write or rename a file into place
    #[error("Failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The settings file is not valid TOML
    #[error("Failed to parse settings at {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The state document is not valid JSON
    #[error("Failed to parse state document at {path}: {source}")]
    StateParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Failed to serialize settings
    #[error("Failed to serialize settings: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Failed to serialize the state document
    #[error("Failed to serialize state document: {0}")]
    StateSerializeError(#[from] serde_json::Error),

    /// Settings contain invalid values
    #[error("Settings validation failed: {0}")]
    ValidationError(String),

    /// Failed to create a directory
    #[error("Failed to create directory at {path}: {source}")]
    DirectoryCreationError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A path could not be determined
    #[error("Could not determine path: {reason}")]
    PathResolutionError { reason: String },

    /// Failed to copy a corrupt file aside
    #[error("Failed to back up {path}: {source}")]
    BackupError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Generic I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Validation error for a specific settings field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Path to the field (e.g., "input.card_debounce_ms")
    pub field: String,

    pub message: String,

    /// The invalid value, if available
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: Some(value.to_string()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Field '{}': {}", self.field, self.message)?;
        if let Some(ref value) = self.value {
            write!(f, " (got: {})", value)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Joins a list of validation errors into one line for logging
pub(crate) fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
