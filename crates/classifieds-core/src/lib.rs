//! Marketplace domain types and services for the classifieds client.
//!
//! - **Catalog**: the static two-level category taxonomy
//! - **Wizard**: guided five-step listing creation and submit
//! - **Listings**: browse with filters and sorting, seller edits
//! - **Favorites**, **Messages** and **Profiles**: per-user services
//!
//! Everything talks to the hosted backend through
//! [`classifieds_store::Backend`] and learns who is signed in from an
//! [`IdentityProvider`](identity::IdentityProvider).
//!
//! # Example
//!
//! ```rust,ignore
//! use classifieds_core::prelude::*;
//! use std::sync::Arc;
//!
//! let backend = Arc::new(tables::memory_backend());
//! let session = Arc::new(Session::signed_in(Identity::new("u1", "me@example.com")));
//!
//! let mut wizard = ListingWizard::new(backend, session);
//! wizard.select_group("Electronics & Appliances")?;
//! wizard.select_category("Mobile Phones")?;
//! wizard.set_title("iPhone 13")?;
//! wizard.set_description("Barely used")?;
//! wizard.set_brand("Apple")?;
//! wizard.next()?;
//! wizard.select_images(vec![ImageFile::new("front.jpg", bytes)])?;
//! wizard.next()?;
//! wizard.set_price("600")?;
//! wizard.set_location("Toronto, ON")?;
//!
//! let outcome = wizard.submit().await?;
//! println!("Posted {}", outcome.listing.id);
//! ```

pub mod config;
pub mod error;
pub mod identity;
pub mod ids;
pub mod money;
pub mod tables;

pub mod catalog;
pub mod favorites;
pub mod listing;
pub mod messages;
pub mod profiles;
pub mod wizard;

pub use config::WizardConfig;
pub use error::{MarketError, MarketResult};
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::WizardConfig;
    pub use crate::error::{MarketError, MarketResult};
    pub use crate::identity::{Identity, IdentityProvider, Session};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::tables;

    // Catalog
    pub use crate::catalog::{Category, CategoryGroup};

    // Listings
    pub use crate::listing::{
        Listing, ListingPatch, ListingQuery, ListingStatus, ListingsService, Location, SortOption,
    };

    // Wizard
    pub use crate::wizard::{
        DraftListing, ErrorKind, ImageFile, ListingWizard, Navigation, SubmitOutcome, SubmitState,
        WizardError, WizardStep,
    };

    // Favorites & messages
    pub use crate::favorites::{Favorite, FavoriteOutcome, FavoriteWithListing, FavoritesService};
    pub use crate::messages::{Message, MessagesService};
    pub use crate::profiles::{Profile, ProfileUpdate, ProfilesService, SocialLinks};
}
