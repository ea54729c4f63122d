//! Listing reads and seller-side edits.

use crate::error::{MarketError, MarketResult};
use crate::identity::{Identity, IdentityProvider};
use crate::ids::{ListingId, UserId};
use crate::listing::{Listing, ListingPatch, ListingQuery, ListingStatus};
use crate::tables;
use classifieds_store::{Backend, Filter, Row, Select};
use std::sync::Arc;

/// Browse, fetch and edit listings.
#[derive(Clone)]
pub struct ListingsService {
    backend: Arc<dyn Backend>,
    identity: Arc<dyn IdentityProvider>,
}

impl ListingsService {
    pub fn new(backend: Arc<dyn Backend>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { backend, identity }
    }

    /// Active listings matching `query`, sorted and paged.
    pub async fn browse(&self, query: &ListingQuery) -> MarketResult<Vec<Listing>> {
        let rows = self
            .backend
            .select_rows(tables::LISTINGS, &query.to_select())
            .await?;
        tracing::debug!(
            count = rows.len(),
            sort = query.sort.as_key(),
            page = query.page,
            "browse"
        );
        decode_all(rows)
    }

    /// Fetch one listing by id, whatever its status.
    pub async fn get(&self, id: &ListingId) -> MarketResult<Listing> {
        let row = self
            .backend
            .select_one(tables::LISTINGS, &Select::all().filter(Filter::eq("id", id)))
            .await?
            .ok_or_else(|| MarketError::ListingNotFound(id.to_string()))?;
        Ok(row.deserialize()?)
    }

    /// All listings posted by `seller`, newest first.
    pub async fn for_seller(&self, seller: &UserId) -> MarketResult<Vec<Listing>> {
        let select = Select::all()
            .filter(Filter::eq("seller_id", seller))
            .order_by("created_at", false);
        decode_all(self.backend.select_rows(tables::LISTINGS, &select).await?)
    }

    /// Apply `patch` to a listing the signed-in user owns.
    pub async fn update(&self, id: &ListingId, patch: &ListingPatch) -> MarketResult<Listing> {
        let who = self.require_seller(id).await?;
        if patch.is_empty() {
            return self.get(id).await;
        }

        let patch = Row::from_serialize(patch)?;
        let updated = self
            .backend
            .update_rows(tables::LISTINGS, &[Filter::eq("id", id)], patch)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MarketError::ListingNotFound(id.to_string()))?;
        tracing::info!(listing = %id, seller = %who.id, "listing updated");
        Ok(updated.deserialize()?)
    }

    /// Mark a listing the signed-in user owns as sold.
    pub async fn mark_sold(&self, id: &ListingId) -> MarketResult<Listing> {
        self.update(id, &ListingPatch::status(ListingStatus::Sold)).await
    }

    /// Delete a listing the signed-in user owns.
    pub async fn delete(&self, id: &ListingId) -> MarketResult<()> {
        let who = self.require_seller(id).await?;
        let removed = self
            .backend
            .delete_rows(
                tables::LISTINGS,
                &[Filter::eq("id", id), Filter::eq("seller_id", &who.id)],
            )
            .await?;
        if removed == 0 {
            return Err(MarketError::ListingNotFound(id.to_string()));
        }
        tracing::info!(listing = %id, seller = %who.id, "listing deleted");
        Ok(())
    }

    async fn require_seller(&self, id: &ListingId) -> MarketResult<Identity> {
        let who = self
            .identity
            .current_identity()
            .ok_or(MarketError::AuthenticationRequired)?;
        let listing = self.get(id).await?;
        if listing.seller_id != who.id {
            tracing::warn!(listing = %id, user = %who.id, "edit by non-seller refused");
            return Err(MarketError::Forbidden(format!(
                "listing {} belongs to another seller",
                id
            )));
        }
        Ok(who)
    }
}

fn decode_all(rows: Vec<Row>) -> MarketResult<Vec<Listing>> {
    rows.iter()
        .map(|row| row.deserialize().map_err(MarketError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Session;
    use crate::listing::{Location, NewListing, SortOption};
    use classifieds_store::MemoryBackend;

    fn new_listing(title: &str, price: f64, seller: &str, category: &str, address: &str) -> NewListing {
        NewListing {
            title: title.into(),
            description: "desc".into(),
            price,
            seller_id: UserId::new(seller),
            category_id: category.into(),
            location: Location::address(address),
            images: Vec::new(),
            status: ListingStatus::Active,
            negotiable: false,
            condition: None,
            brand: None,
            model: None,
            year: None,
        }
    }

    async fn seed(backend: &MemoryBackend, listing: NewListing) -> Listing {
        backend
            .insert_row(tables::LISTINGS, Row::from_serialize(&listing).unwrap())
            .await
            .unwrap()
            .deserialize()
            .unwrap()
    }

    fn service(backend: Arc<MemoryBackend>, session: Arc<Session>) -> ListingsService {
        ListingsService::new(backend, session)
    }

    #[tokio::test]
    async fn test_browse_filters_and_sorts() {
        let backend = Arc::new(MemoryBackend::new());
        seed(&backend, new_listing("Phone", 600.0, "u1", "mobile-phones", "Toronto, ON")).await;
        seed(&backend, new_listing("Cheap phone", 90.0, "u1", "mobile-phones", "Ottawa, ON")).await;
        seed(&backend, new_listing("Laptop", 900.0, "u2", "laptops", "Toronto, ON")).await;
        let mut sold = new_listing("Sold phone", 300.0, "u2", "mobile-phones", "Toronto, ON");
        sold.status = ListingStatus::Sold;
        seed(&backend, sold).await;

        let listings = service(backend, Arc::new(Session::anonymous()));

        let phones = listings
            .browse(
                &ListingQuery::new()
                    .with_category("mobile-phones")
                    .with_sort(SortOption::PriceAsc),
            )
            .await
            .unwrap();
        let titles: Vec<_> = phones.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Cheap phone", "Phone"]);

        let toronto = listings
            .browse(
                &ListingQuery::new()
                    .with_location("toronto")
                    .with_price_range(Some(500.0), Some(800.0)),
            )
            .await
            .unwrap();
        assert_eq!(toronto.len(), 1);
        assert_eq!(toronto[0].title, "Phone");
    }

    #[tokio::test]
    async fn test_get_missing_listing() {
        let listings = service(Arc::new(MemoryBackend::new()), Arc::new(Session::anonymous()));
        let err = listings.get(&ListingId::new("nope")).await.unwrap_err();
        assert_eq!(err, MarketError::ListingNotFound("nope".into()));
    }

    #[tokio::test]
    async fn test_only_seller_may_edit() {
        let backend = Arc::new(MemoryBackend::new());
        let listing = seed(&backend, new_listing("Desk", 80.0, "u1", "furniture", "Ottawa")).await;
        let session = Arc::new(Session::anonymous());
        let listings = service(backend.clone(), session.clone());

        let err = listings.mark_sold(&listing.id).await.unwrap_err();
        assert_eq!(err, MarketError::AuthenticationRequired);

        session.sign_in(Identity::new("u2", "other@example.com"));
        let err = listings.delete(&listing.id).await.unwrap_err();
        assert!(matches!(err, MarketError::Forbidden(_)));

        session.sign_in(Identity::new("u1", "seller@example.com"));
        let sold = listings.mark_sold(&listing.id).await.unwrap();
        assert_eq!(sold.status, ListingStatus::Sold);
        assert!(listings.browse(&ListingQuery::new()).await.unwrap().is_empty());

        listings.delete(&listing.id).await.unwrap();
        assert!(backend.rows(tables::LISTINGS).await.is_empty());
    }
}
