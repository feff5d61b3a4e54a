//! Error types for the store crate.

use thiserror::Error;

/// Errors that can occur while loading, validating or mutating store documents
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error occurred while reading a snapshot file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Snapshot document couldn't be parsed
    #[error("Parse error in {file}: {source}")]
    ParseError {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// A document field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Referenced entity doesn't exist (e.g., a friend uid with no profile)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: String },

    /// A requested document doesn't exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Cross-document validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl StoreError {
    pub(crate) fn invalid(field: &str, value: impl ToString) -> Self {
        StoreError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, StoreError>;
