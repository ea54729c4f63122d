//! Persistence capability for the classifieds marketplace.
//!
//! The hosted backend (authentication, row storage, object storage) is an
//! external collaborator. This crate describes the narrow slice of it the
//! marketplace consumes, as the async [`Backend`] trait, and ships
//! [`MemoryBackend`], a complete in-process implementation used by tests
//! and local tooling.
//!
//! # Example
//!
//! ```rust,ignore
//! use classifieds_store::{Backend, Filter, MemoryBackend, Row, Select};
//! use serde_json::json;
//!
//! let backend = MemoryBackend::new();
//!
//! // Insert a record; the backend assigns `id` and timestamps
//! let row = backend
//!     .insert_row("listings", Row::from_serialize(&json!({ "title": "Bike", "price": 120 }))?)
//!     .await?;
//!
//! // Query with filters and ordering
//! let cheap = backend
//!     .select_rows(
//!         "listings",
//!         &Select::all().filter(Filter::lte("price", 200)).order_by("price", true),
//!     )
//!     .await?;
//! ```

mod backend;
mod error;
mod memory;
mod query;
mod types;

pub use backend::Backend;
pub use error::{StoreError, StoreResult};
pub use memory::{CallCounts, MemoryBackend, Snapshot, StoredObject};
pub use query::{Filter, Order, Select};
pub use types::{compare_values, values_equal, Row};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Backend, Filter, MemoryBackend, Row, Select, StoreError, StoreResult};
}
