//! Marketplace service errors.

use classifieds_store::StoreError;
use thiserror::Error;

/// Errors that can occur in listing, favorite and message operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    /// No one is signed in.
    #[error("Sign in required")]
    AuthenticationRequired,

    /// Listing not found.
    #[error("Listing not found: {0}")]
    ListingNotFound(String),

    /// Message not found.
    #[error("Message not found: {0}")]
    MessageNotFound(String),

    /// The signed-in user may not touch this record.
    #[error("Not allowed: {0}")]
    Forbidden(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for MarketError {
    fn from(e: StoreError) -> Self {
        MarketError::Backend(e.to_string())
    }
}

/// Result alias for marketplace services.
pub type MarketResult<T> = Result<T, MarketError>;
