//! Static category data and lookups.

use crate::ids::CategoryId;
use serde::Serialize;

/// A leaf category a listing is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Category {
    /// Display name.
    pub name: &'static str,
    /// URL-friendly slug, used as the category identifier.
    pub slug: &'static str,
    /// Icon glyph.
    pub icon: &'static str,
}

impl Category {
    /// The identifier stored on listings.
    pub fn id(&self) -> CategoryId {
        CategoryId::new(self.slug)
    }

    fn matches(&self, key: &str) -> bool {
        self.name == key || self.slug == key
    }
}

/// A top-level group of categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CategoryGroup {
    /// Display name.
    pub name: &'static str,
    /// URL-friendly slug.
    pub slug: &'static str,
    /// Subcategories in display order.
    pub categories: &'static [Category],
}

impl CategoryGroup {
    /// The group's icon: its first subcategory's glyph.
    pub fn icon(&self) -> &'static str {
        self.categories.first().map(|c| c.icon).unwrap_or("")
    }

    /// Find a subcategory by display name or slug.
    pub fn find(&self, key: &str) -> Option<&'static Category> {
        self.categories.iter().find(|c| c.matches(key))
    }

    /// Check whether `category` belongs to this group.
    pub fn contains(&self, category: &Category) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

macro_rules! category {
    ($name:literal, $slug:literal, $icon:literal) => {
        Category {
            name: $name,
            slug: $slug,
            icon: $icon,
        }
    };
}

/// The full catalog, in display order.
pub static CATALOG: &[CategoryGroup] = &[
    CategoryGroup {
        name: "Vehicles",
        slug: "vehicles",
        categories: &[
            category!("Cars", "cars", "\u{1f697}"),
            category!("Motorcycles", "motorcycles", "\u{1f3cd}\u{fe0f}"),
            category!("Commercial Vehicles", "commercial-vehicles", "\u{1f69b}"),
            category!("Spare Parts", "spare-parts", "\u{1f527}"),
            category!("Other Vehicles", "other-vehicles", "\u{1f690}"),
        ],
    },
    CategoryGroup {
        name: "Properties",
        slug: "properties",
        categories: &[
            category!("For Sale: Houses & Apartments", "for-sale-houses-apartments", "\u{1f3e0}"),
            category!("For Rent: Houses & Apartments", "for-rent-houses-apartments", "\u{1f3e2}"),
            category!("Lands & Plots", "lands-plots", "\u{1f5fa}\u{fe0f}"),
            category!("For Rent: Shops & Offices", "for-rent-shops-offices", "\u{1f3ea}"),
            category!("For Sale: Shops & Offices", "for-sale-shops-offices", "\u{1f3ec}"),
            category!("PG & Guest Houses", "pg-guest-houses", "\u{1f3e8}"),
        ],
    },
    CategoryGroup {
        name: "Electronics & Appliances",
        slug: "electronics-appliances",
        categories: &[
            category!("Mobile Phones", "mobile-phones", "\u{1f4f1}"),
            category!("Laptops", "laptops", "\u{1f4bb}"),
            category!("TVs", "tvs", "\u{1f4fa}"),
            category!("Computer Accessories", "computer-accessories", "\u{1f5b1}\u{fe0f}"),
            category!("Kitchen Appliances", "kitchen-appliances", "\u{1f373}"),
            category!("Cameras", "cameras", "\u{1f4f8}"),
        ],
    },
    CategoryGroup {
        name: "Fashion",
        slug: "fashion",
        categories: &[
            category!("Men's Fashion", "mens-fashion", "\u{1f454}"),
            category!("Women's Fashion", "womens-fashion", "\u{1f457}"),
            category!("Kids' Fashion", "kids-fashion", "\u{1f476}"),
            category!("Watches", "watches", "\u{231a}"),
            category!("Accessories", "accessories", "\u{1f45c}"),
        ],
    },
    CategoryGroup {
        name: "Home & Garden",
        slug: "home-garden",
        categories: &[
            category!("Furniture", "furniture", "\u{1f6cb}\u{fe0f}"),
            category!("Home Decor", "home-decor", "\u{1f3fa}"),
            category!("Garden", "garden", "\u{1f33a}"),
            category!("Home Storage", "home-storage", "\u{1f4e6}"),
            category!("Kitchen & Dining", "kitchen-dining", "\u{1f37d}\u{fe0f}"),
        ],
    },
    CategoryGroup {
        name: "Sports & Hobbies",
        slug: "sports-hobbies",
        categories: &[
            category!("Books", "books", "\u{1f4da}"),
            category!("Gym & Fitness", "gym-fitness", "\u{1f3cb}\u{fe0f}"),
            category!("Musical Instruments", "musical-instruments", "\u{1f3b8}"),
            category!("Sports Equipment", "sports-equipment", "\u{26bd}"),
            category!("Other Hobbies", "other-hobbies", "\u{1f3a8}"),
        ],
    },
    CategoryGroup {
        name: "Jobs",
        slug: "jobs",
        categories: &[
            category!("IT Jobs", "it-jobs", "\u{1f4bb}"),
            category!("Sales & Marketing", "sales-marketing", "\u{1f4ca}"),
            category!("Customer Service", "customer-service", "\u{1f3af}"),
            category!("Driver Jobs", "driver-jobs", "\u{1f697}"),
            category!("Other Jobs", "other-jobs", "\u{1f4bc}"),
        ],
    },
    CategoryGroup {
        name: "Services",
        slug: "services",
        categories: &[
            category!("Electronics Repair", "electronics-repair", "\u{1f527}"),
            category!("Home Services", "home-services", "\u{1f3e0}"),
            category!("Education", "education", "\u{1f4da}"),
            category!("Packers & Movers", "packers-movers", "\u{1f4e6}"),
            category!("Other Services", "other-services", "\u{1f6e0}\u{fe0f}"),
        ],
    },
    CategoryGroup {
        name: "Pets",
        slug: "pets",
        categories: &[
            category!("Dogs", "dogs", "\u{1f415}"),
            category!("Cats", "cats", "\u{1f408}"),
            category!("Fish & Aquarium", "fish-aquarium", "\u{1f420}"),
            category!("Pet Food & Accessories", "pet-food-accessories", "\u{1f9b4}"),
            category!("Other Pets", "other-pets", "\u{1f43e}"),
        ],
    },
];

/// All category groups, in display order.
pub fn groups() -> &'static [CategoryGroup] {
    CATALOG
}

/// Find a group by display name or slug.
pub fn find_group(key: &str) -> Option<&'static CategoryGroup> {
    CATALOG.iter().find(|g| g.name == key || g.slug == key)
}

/// Find a subcategory anywhere in the catalog by slug or display name.
pub fn find_category(key: &str) -> Option<(&'static CategoryGroup, &'static Category)> {
    CATALOG
        .iter()
        .find_map(|g| g.find(key).map(|c| (g, c)))
}

/// Derive a slug from a display name.
///
/// Apostrophes are dropped; any other run of non-alphanumeric characters
/// becomes a single hyphen.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars().filter(|c| *c != '\'') {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_shape() {
        assert_eq!(groups().len(), 9);
        for group in groups() {
            assert!(!group.categories.is_empty());
            assert!(group.categories.len() <= 6, "{} has too many", group.name);
        }
    }

    #[test]
    fn test_slugs_follow_names_and_are_unique() {
        let mut seen = HashSet::new();
        for group in groups() {
            assert_eq!(group.slug, slugify(group.name));
            for category in group.categories {
                assert_eq!(category.slug, slugify(category.name));
                assert!(seen.insert(category.slug), "duplicate slug {}", category.slug);
            }
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Mobile Phones"), "mobile-phones");
        assert_eq!(slugify("For Sale: Houses & Apartments"), "for-sale-houses-apartments");
        assert_eq!(slugify("Men's Fashion"), "mens-fashion");
        assert_eq!(slugify("  TVs  "), "tvs");
    }

    #[test]
    fn test_lookup() {
        let group = find_group("Electronics & Appliances").unwrap();
        assert_eq!(group.icon(), "\u{1f4f1}");
        let phones = group.find("Mobile Phones").unwrap();
        assert_eq!(phones.id().as_str(), "mobile-phones");
        assert!(group.contains(phones));

        assert_eq!(find_group("pets").map(|g| g.name), Some("Pets"));
        assert!(find_group("Boats").is_none());

        let (owner, cat) = find_category("lands-plots").unwrap();
        assert_eq!(owner.name, "Properties");
        assert_eq!(cat.name, "Lands & Plots");
    }
}
