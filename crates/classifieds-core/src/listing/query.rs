//! Browse query builder.

use crate::ids::CategoryId;
use crate::listing::ListingStatus;
use classifieds_store::{Filter, Select};
use serde::{Deserialize, Serialize};

/// Sort options for browse results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    /// Price, low to high.
    PriceAsc,
    /// Price, high to low.
    PriceDesc,
    /// Newest first.
    #[default]
    DateDesc,
    /// Most viewed first.
    ViewsDesc,
}

impl SortOption {
    /// Parse a sort key. Unknown keys fall back to newest first.
    ///
    /// Both the short keys (`price_asc`) and the long ones used by the
    /// product listing pages (`price_low_to_high`) are accepted.
    pub fn from_key(key: &str) -> Self {
        match key {
            "price_asc" | "price_low_to_high" => SortOption::PriceAsc,
            "price_desc" | "price_high_to_low" => SortOption::PriceDesc,
            "views_desc" => SortOption::ViewsDesc,
            _ => SortOption::DateDesc,
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            SortOption::PriceAsc => "price_asc",
            SortOption::PriceDesc => "price_desc",
            SortOption::DateDesc => "date_desc",
            SortOption::ViewsDesc => "views_desc",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortOption::PriceAsc => "Price: Low to High",
            SortOption::PriceDesc => "Price: High to Low",
            SortOption::DateDesc => "Newest First",
            SortOption::ViewsDesc => "Most Viewed",
        }
    }

    /// Column and direction (`true` = ascending).
    pub fn order(&self) -> (&'static str, bool) {
        match self {
            SortOption::PriceAsc => ("price", true),
            SortOption::PriceDesc => ("price", false),
            SortOption::DateDesc => ("created_at", false),
            SortOption::ViewsDesc => ("views_count", false),
        }
    }
}

/// Filters, sort and page for browsing active listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingQuery {
    pub category_id: Option<CategoryId>,
    /// Case-insensitive substring of the address.
    pub location: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub condition: Option<String>,
    pub sort: SortOption,
    /// Current page (1-indexed).
    pub page: usize,
    /// Items per page.
    pub per_page: usize,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingQuery {
    /// Create an unfiltered query, newest first.
    pub fn new() -> Self {
        Self {
            category_id: None,
            location: None,
            price_min: None,
            price_max: None,
            condition: None,
            sort: SortOption::DateDesc,
            page: 1,
            per_page: 24,
        }
    }

    /// Restrict to a category.
    pub fn with_category(mut self, id: impl Into<CategoryId>) -> Self {
        self.category_id = Some(id.into());
        self
    }

    /// Restrict to addresses containing `text`.
    pub fn with_location(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.location = (!text.trim().is_empty()).then(|| text.trim().to_string());
        self
    }

    /// Restrict the price range.
    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.price_min = min;
        self.price_max = max;
        self
    }

    /// Restrict to a condition.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Set sort option.
    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    /// Set pagination.
    pub fn with_pagination(mut self, page: usize, per_page: usize) -> Self {
        self.page = page.max(1);
        self.per_page = per_page.clamp(1, 100);
        self
    }

    /// Rows to skip for the current page.
    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1).saturating_mul(self.per_page)
    }

    /// Build the backend select.
    pub fn to_select(&self) -> Select {
        let mut select = Select::all().filter(Filter::eq("status", ListingStatus::Active.as_str()));

        if let Some(ref id) = self.category_id {
            select = select.filter(Filter::eq("category_id", id));
        }
        if let Some(ref text) = self.location {
            select = select.filter(Filter::ilike("location.address", text.as_str()));
        }
        if let Some(min) = self.price_min {
            select = select.filter(Filter::gte("price", min));
        }
        if let Some(max) = self.price_max {
            select = select.filter(Filter::lte("price", max));
        }
        if let Some(ref condition) = self.condition {
            select = select.filter(Filter::eq("condition", condition.as_str()));
        }

        let (column, ascending) = self.sort.order();
        select.order_by(column, ascending).range(self.offset(), self.per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_builder() {
        let query = ListingQuery::new()
            .with_category("laptops")
            .with_sort(SortOption::PriceAsc)
            .with_pagination(2, 10);

        assert_eq!(query.page, 2);
        assert_eq!(query.per_page, 10);
        assert_eq!(query.offset(), 10);
        assert_eq!(query.sort, SortOption::PriceAsc);
    }

    #[test]
    fn test_pagination_clamps() {
        let query = ListingQuery::new().with_pagination(0, 1000);
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 100);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_huge_page_saturates() {
        let query = ListingQuery::new().with_pagination(usize::MAX, 24);
        assert_eq!(query.offset(), usize::MAX);
        assert_eq!(query.to_select().offset, usize::MAX);
        assert!(query.to_select().apply(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_select_filters() {
        let select = ListingQuery::new()
            .with_location("  toronto ")
            .with_price_range(Some(100.0), None)
            .to_select();

        assert_eq!(select.filters[0], Filter::Eq("status".into(), json!("active")));
        assert!(select.filters.contains(&Filter::ILike("location.address".into(), "toronto".into())));
        assert!(select.filters.contains(&Filter::Gte("price".into(), json!(100.0))));
        assert_eq!(select.filters.len(), 3);
        assert_eq!(select.order[0].column, "created_at");
        assert!(!select.order[0].ascending);
        assert_eq!(select.limit, Some(24));
    }

    #[test]
    fn test_blank_location_is_ignored() {
        let query = ListingQuery::new().with_location("   ");
        assert!(query.location.is_none());
    }

    #[test]
    fn test_sort_keys() {
        assert_eq!(SortOption::from_key("price_low_to_high"), SortOption::PriceAsc);
        assert_eq!(SortOption::from_key("price_desc"), SortOption::PriceDesc);
        assert_eq!(SortOption::from_key("views_desc"), SortOption::ViewsDesc);
        assert_eq!(SortOption::from_key("whatever"), SortOption::DateDesc);
        assert_eq!(SortOption::from_key(SortOption::ViewsDesc.as_key()), SortOption::ViewsDesc);
    }
}
