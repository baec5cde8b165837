//! Error types for axiom-settings

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the settings registry
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Value Errors
    // -------------------------------------------------------------------------
    #[error("Failed to parse '{input}' for {key} as {expected}: {reason}")]
    Parse {
        key: String,
        expected: String,
        input: String,
        reason: String,
    },

    #[error("Invalid value for {key}: {reason}")]
    Validation { key: String, reason: String },

    #[error("Cross-setting rule '{rule}' failed: {reason}")]
    CrossValidation { rule: String, reason: String },

    // -------------------------------------------------------------------------
    // Schema Errors
    // -------------------------------------------------------------------------
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Invalid schema for {key}: {reason}")]
    InvalidSchema { key: String, reason: String },

    // -------------------------------------------------------------------------
    // Overlay Errors
    // -------------------------------------------------------------------------
    #[error("Settings source '{path}' unavailable: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    #[error("Overlay must be a flat mapping of setting names to values, got {0}")]
    InvalidOverlayShape(String),

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(String),

    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    #[error("Cannot update {0} from inside an observer callback")]
    ReentrantUpdate(String),
}

impl Error {
    /// Check if this is a "not found" type error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::UnknownSetting(_))
    }

    /// Check if a candidate value was rejected (parse or validation failure)
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::Parse { .. } | Error::Validation { .. })
    }

    pub(crate) fn validation(key: &str, reason: impl Into<String>) -> Self {
        Error::Validation {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialize(e.to_string())
    }
}
