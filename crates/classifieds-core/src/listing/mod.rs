//! Listings: stored records, browse queries and the listings service.

#[allow(clippy::module_inception)]
mod listing;
mod query;
mod service;

pub use listing::{Listing, ListingPatch, ListingStatus, Location, NewListing};
pub use query::{ListingQuery, SortOption};
pub use service::ListingsService;
