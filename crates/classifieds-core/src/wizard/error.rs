//! Wizard errors and the notices shown for them.

use crate::ids::ListingId;
use crate::wizard::WizardStep;
use classifieds_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Errors raised by the listing wizard.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    /// No one is signed in at submit time.
    #[error("Sign in required to post a listing")]
    AuthenticationRequired,

    /// A required field is empty or a value does not parse.
    #[error("Invalid listing: {0}")]
    ValidationFailure(String),

    /// An image could not be stored.
    #[error("Upload of {file} failed: {reason}")]
    UploadFailure { file: String, reason: String },

    /// The listing row could not be inserted.
    #[error("Failed to save listing: {0}")]
    PersistenceFailure(String),

    /// A batch larger than the limit was selected.
    #[error("{selected} images selected, at most {max} allowed")]
    TooManyImages { max: usize, selected: usize },

    /// The action is not available at the current step.
    #[error("Cannot {action} at the {step} step")]
    InvalidTransition {
        step: WizardStep,
        action: &'static str,
    },

    /// Catalog lookup missed.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// A submission is already running.
    #[error("A submission is already in progress")]
    SubmitInProgress,
}

/// Broad classification of a [`WizardError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AuthenticationRequired,
    ValidationFailure,
    UploadFailure,
    PersistenceFailure,
    TooManyImages,
    InvalidTransition,
    UnknownCategory,
    SubmitInProgress,
}

/// Where the front end should go after an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "to", content = "id", rename_all = "snake_case")]
pub enum Navigation {
    /// Leave the wizard; the draft is gone.
    Exit,
    /// Send the user to sign in.
    SignIn,
    /// Show the new listing.
    ListingDetail(ListingId),
}

impl WizardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WizardError::AuthenticationRequired => ErrorKind::AuthenticationRequired,
            WizardError::ValidationFailure(_) => ErrorKind::ValidationFailure,
            WizardError::UploadFailure { .. } => ErrorKind::UploadFailure,
            WizardError::PersistenceFailure(_) => ErrorKind::PersistenceFailure,
            WizardError::TooManyImages { .. } => ErrorKind::TooManyImages,
            WizardError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            WizardError::UnknownCategory(_) => ErrorKind::UnknownCategory,
            WizardError::SubmitInProgress => ErrorKind::SubmitInProgress,
        }
    }

    /// The single user-visible notice for this error.
    pub fn notice(&self) -> String {
        match self {
            WizardError::AuthenticationRequired => "Please sign in to create a listing".to_string(),
            WizardError::ValidationFailure(reason) => format!("Please check your listing: {}", reason),
            WizardError::UploadFailure { .. } | WizardError::PersistenceFailure(_) => {
                "Failed to create listing".to_string()
            }
            WizardError::TooManyImages { max, .. } => format!("Maximum {} images allowed", max),
            WizardError::InvalidTransition { .. } => "That action is not available here".to_string(),
            WizardError::UnknownCategory(name) => format!("Unknown category: {}", name),
            WizardError::SubmitInProgress => "Your listing is already being posted".to_string(),
        }
    }

    /// Navigation that accompanies the error, if any.
    pub fn navigation(&self) -> Option<Navigation> {
        match self {
            WizardError::AuthenticationRequired => Some(Navigation::SignIn),
            _ => None,
        }
    }

    /// Check if the user can retry from the same draft. Sign-in takes the
    /// user out of the wizard.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, WizardError::AuthenticationRequired)
    }

    pub(crate) fn upload(file: &str, err: StoreError) -> Self {
        WizardError::UploadFailure {
            file: file.to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<StoreError> for WizardError {
    fn from(e: StoreError) -> Self {
        WizardError::PersistenceFailure(e.to_string())
    }
}
