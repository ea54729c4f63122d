//! Five-step listing creation wizard.
//!
//! The seller picks a category group, then a subcategory, fills in details,
//! selects photos, and sets price and location. Submitting uploads every
//! photo before inserting the one listing row that references them, so a
//! listing never exists without its images.

mod draft;
mod error;
mod flow;
mod step;
pub mod submit;

pub use draft::{DraftListing, ImageFile, ValidatedFields};
pub use error::{ErrorKind, Navigation, WizardError};
pub use flow::{ListingWizard, SubmitOutcome, SubmitState};
pub use step::WizardStep;
