//! Backend error types.

use thiserror::Error;

/// Errors reported by a persistence backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// A unique constraint rejected the write.
    #[error("Duplicate value violates unique constraint on {table} ({columns})")]
    Conflict { table: String, columns: String },

    /// An object already exists at the upload path.
    #[error("Object already exists: {0}")]
    ObjectExists(String),

    /// The backend refused the request.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// A record could not be converted to or from JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No rows returned when one was expected.
    #[error("No rows returned")]
    NotFound,
}

impl StoreError {
    /// Check if this error is a unique-constraint violation.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    /// Check if the backend was unreachable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result alias for backend operations.
pub type StoreResult<T> = Result<T, StoreError>;
