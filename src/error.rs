//! Error types for deploycfg library

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Result type alias for deploycfg operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for deploycfg library
///
/// Resolution failures are reported through [`ValidationErrors`]; this enum
/// covers everything around them (schema construction, typed access,
/// snapshot files, export).
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to parse environment snapshot: {0}")]
    Parse(String),

    #[cfg(feature = "toml")]
    #[error("Failed to render TOML: {0}")]
    Toml(#[from] toml::ser::Error),

    #[cfg(feature = "yaml")]
    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // -------------------------------------------------------------------------
    // Schema Errors
    // -------------------------------------------------------------------------
    #[error("Duplicate setting key in schema: {0}")]
    DuplicateKey(String),

    #[error("Invalid setting spec for {key}: {reason}")]
    InvalidSchema { key: String, reason: String },

    // -------------------------------------------------------------------------
    // Resolved Config Errors
    // -------------------------------------------------------------------------
    #[error("Setting not found: {0}")]
    SettingNotFound(String),

    #[error("Type mismatch for {key}: expected {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("Configuration is invalid:\n{0}")]
    Validation(#[from] ValidationErrors),
}

impl Error {
    /// Check if this is a "not found" type error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::SettingNotFound(_))
    }

    /// Check if this error comes from an invalid schema definition
    #[must_use]
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Error::DuplicateKey(_) | Error::InvalidSchema { .. }
        )
    }

    pub(crate) fn invalid_schema(key: &str, reason: impl Into<String>) -> Self {
        Error::InvalidSchema {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Read a file to string with proper error handling
pub(crate) fn read_file(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}
