//! Category catalog.
//!
//! A fixed two-level taxonomy compiled into the client: groups, each with an
//! ordered list of subcategories.

mod category;

pub use category::{find_category, find_group, groups, slugify, Category, CategoryGroup, CATALOG};
