//! Saved listings.

use crate::error::{MarketError, MarketResult};
use crate::identity::{Identity, IdentityProvider};
use crate::ids::{FavoriteId, ListingId, UserId};
use crate::listing::Listing;
use crate::tables;
use chrono::{DateTime, Utc};
use classifieds_store::{Backend, Filter, Row, Select, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A row in the `favorites` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Favorite {
    pub id: FavoriteId,
    pub user_id: UserId,
    /// The saved listing.
    pub product_id: ListingId,
    pub created_at: DateTime<Utc>,
}

/// A favorite together with the listing it points at.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FavoriteWithListing {
    #[serde(flatten)]
    pub favorite: Favorite,
    pub listing: Listing,
}

/// What [`FavoritesService::add`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum FavoriteOutcome {
    Added(Favorite),
    AlreadyFavorited,
}

/// Add, remove and list the signed-in user's favorites.
#[derive(Clone)]
pub struct FavoritesService {
    backend: Arc<dyn Backend>,
    identity: Arc<dyn IdentityProvider>,
}

impl FavoritesService {
    pub fn new(backend: Arc<dyn Backend>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { backend, identity }
    }

    /// Save a listing. Saving it twice is not an error.
    pub async fn add(&self, listing: &ListingId) -> MarketResult<FavoriteOutcome> {
        let who = self.require_identity()?;
        let mut record = Row::new();
        record.set("user_id", &who.id);
        record.set("product_id", listing);

        match self.backend.insert_row(tables::FAVORITES, record).await {
            Ok(row) => {
                tracing::debug!(user = %who.id, listing = %listing, "favorite added");
                Ok(FavoriteOutcome::Added(row.deserialize()?))
            }
            Err(StoreError::Conflict { .. }) => {
                tracing::debug!(user = %who.id, listing = %listing, "already favorited");
                Ok(FavoriteOutcome::AlreadyFavorited)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Forget a saved listing.
    pub async fn remove(&self, listing: &ListingId) -> MarketResult<()> {
        let who = self.require_identity()?;
        let removed = self
            .backend
            .delete_rows(tables::FAVORITES, &match_pair(&who.id, listing))
            .await?;
        tracing::debug!(user = %who.id, listing = %listing, removed, "favorite removed");
        Ok(())
    }

    /// Check if the signed-in user saved `listing`. Anonymous visitors have
    /// no favorites.
    pub async fn is_favorited(&self, listing: &ListingId) -> MarketResult<bool> {
        let Some(who) = self.identity.current_identity() else {
            return Ok(false);
        };
        let found = self
            .backend
            .select_one(
                tables::FAVORITES,
                &Select::all().filters(match_pair(&who.id, listing)),
            )
            .await?;
        Ok(found.is_some())
    }

    /// Save or forget `listing`, returning whether it is now saved.
    pub async fn toggle(&self, listing: &ListingId) -> MarketResult<bool> {
        if self.is_favorited(listing).await? {
            self.remove(listing).await?;
            Ok(false)
        } else {
            self.add(listing).await?;
            Ok(true)
        }
    }

    /// The signed-in user's favorites with their listings. Favorites whose
    /// listing is gone are skipped.
    pub async fn list(&self) -> MarketResult<Vec<FavoriteWithListing>> {
        let who = self.require_identity()?;
        let favorites: Vec<Favorite> = self
            .backend
            .select_rows(
                tables::FAVORITES,
                &Select::all()
                    .filter(Filter::eq("user_id", &who.id))
                    .order_by("created_at", false),
            )
            .await?
            .iter()
            .map(|row| row.deserialize().map_err(MarketError::from))
            .collect::<MarketResult<_>>()?;
        if favorites.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<&ListingId> = favorites.iter().map(|f| &f.product_id).collect();
        let mut listings: HashMap<ListingId, Listing> = HashMap::new();
        for row in self
            .backend
            .select_rows(tables::LISTINGS, &Select::all().filter(Filter::is_in("id", ids)))
            .await?
        {
            let listing: Listing = row.deserialize()?;
            listings.insert(listing.id.clone(), listing);
        }

        Ok(favorites
            .into_iter()
            .filter_map(|favorite| {
                let listing = listings.get(&favorite.product_id)?.clone();
                Some(FavoriteWithListing { favorite, listing })
            })
            .collect())
    }

    fn require_identity(&self) -> MarketResult<Identity> {
        self.identity
            .current_identity()
            .ok_or(MarketError::AuthenticationRequired)
    }
}

fn match_pair(user: &UserId, listing: &ListingId) -> Vec<Filter> {
    vec![
        Filter::eq("user_id", user),
        Filter::eq("product_id", listing),
    ]
}
