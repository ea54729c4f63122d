//! Listing records as stored in the `listings` table.

use crate::ids::{CategoryId, ListingId, UserId};
use crate::money::{Currency, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Listing visibility status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    /// Visible in browse results.
    #[default]
    Active,
    /// Sold; kept for the seller's history.
    Sold,
    /// Hidden by the seller.
    Archived,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Sold => "sold",
            ListingStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(ListingStatus::Active),
            "sold" => Ok(ListingStatus::Sold),
            "archived" => Ok(ListingStatus::Archived),
            _ => Err(()),
        }
    }
}

/// Where the item is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    /// Free-text address.
    pub address: String,
    /// Optional `[lat, lng]` pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<(f64, f64)>,
}

impl Location {
    /// Create a location from an address only.
    pub fn address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            coordinates: None,
        }
    }
}

/// A listing row ready to insert. The backend assigns id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub seller_id: UserId,
    pub category_id: CategoryId,
    pub location: Location,
    pub images: Vec<String>,
    pub status: ListingStatus,
    #[serde(default)]
    pub negotiable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// A stored listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    /// Unique listing identifier.
    pub id: ListingId,
    /// Ad title (at most 70 characters when created through the wizard).
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Asking price as a decimal.
    pub price: f64,
    /// Who posted it.
    pub seller_id: UserId,
    /// Leaf category slug.
    pub category_id: CategoryId,
    /// Item location.
    pub location: Location,
    /// Public image URLs, in the order the seller picked them.
    #[serde(default)]
    pub images: Vec<String>,
    /// Visibility status.
    #[serde(default)]
    pub status: ListingStatus,
    /// Whether the seller accepts offers.
    #[serde(default)]
    pub negotiable: bool,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    /// Detail-page views.
    #[serde(default)]
    pub views_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Check if the listing shows up in browse results.
    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }

    /// The price as [`Money`].
    pub fn price_money(&self, currency: Currency) -> Money {
        Money::from_decimal(self.price, currency)
    }

    /// First image, used as the thumbnail.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A partial update to a listing. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ListingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negotiable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl ListingPatch {
    /// A patch that only changes the status.
    pub fn status(status: ListingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Check if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_listing_row_shape() {
        let listing = NewListing {
            title: "iPhone 13".into(),
            description: "Barely used".into(),
            price: 600.0,
            seller_id: UserId::new("u1"),
            category_id: CategoryId::new("mobile-phones"),
            location: Location::address("Toronto, ON"),
            images: vec!["a".into()],
            status: ListingStatus::Active,
            negotiable: false,
            condition: None,
            brand: Some("Apple".into()),
            model: None,
            year: None,
        };
        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value["status"], json!("active"));
        assert_eq!(value["location"], json!({ "address": "Toronto, ON" }));
        assert_eq!(value["category_id"], json!("mobile-phones"));
        assert!(value.get("model").is_none());
    }

    #[test]
    fn test_listing_from_row() {
        let listing: Listing = serde_json::from_value(json!({
            "id": "l1",
            "title": "Desk",
            "description": "Oak",
            "price": 80,
            "seller_id": "u1",
            "category_id": "furniture",
            "location": { "address": "Ottawa, ON", "coordinates": [45.4, -75.7] },
            "images": ["https://cdn/x.jpg"],
            "status": "sold",
            "created_at": "2024-01-01T00:00:00.000000Z",
            "updated_at": "2024-01-02T00:00:00.000000Z"
        }))
        .unwrap();
        assert_eq!(listing.status, ListingStatus::Sold);
        assert_eq!(listing.views_count, 0);
        assert_eq!(listing.location.coordinates, Some((45.4, -75.7)));
        assert_eq!(listing.primary_image(), Some("https://cdn/x.jpg"));
        assert_eq!(listing.price_money(Currency::CAD).display(), "CA$80.00");
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = ListingPatch::status(ListingStatus::Sold);
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "status": "sold" }));
        assert!(ListingPatch::default().is_empty());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("ACTIVE".parse(), Ok(ListingStatus::Active));
        assert!("deleted".parse::<ListingStatus>().is_err());
    }
}
