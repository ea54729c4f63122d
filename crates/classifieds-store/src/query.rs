//! Row filters and select builder.

use crate::types::{compare_values, values_equal, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// A predicate over a single column path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Filter {
    /// Column equals value.
    Eq(String, Value),
    /// Column differs from value (missing columns match).
    Neq(String, Value),
    /// Column is greater than or equal to value.
    Gte(String, Value),
    /// Column is less than or equal to value.
    Lte(String, Value),
    /// Case-insensitive substring match on a string column.
    ILike(String, String),
    /// Column equals any of the values.
    In(String, Vec<Value>),
    /// Any of the nested filters matches.
    Or(Vec<Filter>),
}

impl Filter {
    /// Create an equality filter.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(column.into(), value.into())
    }

    /// Create an inequality filter.
    pub fn neq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Neq(column.into(), value.into())
    }

    /// Create a lower-bound filter.
    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gte(column.into(), value.into())
    }

    /// Create an upper-bound filter.
    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lte(column.into(), value.into())
    }

    /// Create a case-insensitive substring filter.
    pub fn ilike(column: impl Into<String>, needle: impl Into<String>) -> Self {
        Filter::ILike(column.into(), needle.into())
    }

    /// Create a membership filter.
    pub fn is_in<V: Into<Value>>(column: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In(column.into(), values.into_iter().map(Into::into).collect())
    }

    /// Create a disjunction.
    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or(filters)
    }

    /// Evaluate the filter against a row.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Filter::Eq(col, v) => row.get_path(col).is_some_and(|x| values_equal(x, v)),
            Filter::Neq(col, v) => !row.get_path(col).is_some_and(|x| values_equal(x, v)),
            Filter::Gte(col, v) => row
                .get_path(col)
                .and_then(|x| compare_values(x, v))
                .is_some_and(|o| o != Ordering::Less),
            Filter::Lte(col, v) => row
                .get_path(col)
                .and_then(|x| compare_values(x, v))
                .is_some_and(|o| o != Ordering::Greater),
            Filter::ILike(col, needle) => row
                .get_path(col)
                .and_then(Value::as_str)
                .is_some_and(|s| s.to_lowercase().contains(&needle.to_lowercase())),
            Filter::In(col, values) => row
                .get_path(col)
                .is_some_and(|x| values.iter().any(|v| values_equal(x, v))),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(row)),
        }
    }
}

/// Ordering on a single column path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    /// Column path to sort by.
    pub column: String,
    /// Sort direction.
    pub ascending: bool,
}

/// A select request: filters, ordering and an optional page window.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Select {
    /// All filters must match.
    pub filters: Vec<Filter>,
    /// Sort keys, applied in order.
    pub order: Vec<Order>,
    /// Rows to skip.
    pub offset: usize,
    /// Maximum rows to return.
    pub limit: Option<usize>,
}

impl Select {
    /// Select every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a filter.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add several filters.
    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Add a sort key.
    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order.push(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    /// Restrict to a window of rows.
    pub fn range(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    /// Return at most `limit` rows.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check a row against every filter.
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Run the select over an in-memory set of rows.
    ///
    /// Sorting is stable, so rows with equal keys keep their input order.
    /// Rows missing a sort column go last in either direction.
    pub fn apply<'a>(&self, rows: impl IntoIterator<Item = &'a Row>) -> Vec<Row> {
        let mut matched: Vec<&Row> = rows.into_iter().filter(|r| self.matches(r)).collect();

        if !self.order.is_empty() {
            matched.sort_by(|a, b| {
                for key in &self.order {
                    let ord = compare_column(a, b, key);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }

        let iter = matched.into_iter().skip(self.offset).cloned();
        match self.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }
}

fn compare_column(a: &Row, b: &Row, key: &Order) -> Ordering {
    match (a.get_path(&key.column), b.get_path(&key.column)) {
        (Some(x), Some(y)) => {
            let ord = compare_values(x, y).unwrap_or(Ordering::Equal);
            if key.ascending {
                ord
            } else {
                ord.reverse()
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Row> {
        vec![
            json!({ "id": "a", "price": 600, "status": "active", "location": { "address": "Toronto, ON" } }),
            json!({ "id": "b", "price": 25.5, "status": "sold", "location": { "address": "Ottawa, ON" } }),
            json!({ "id": "c", "price": 1200, "status": "active", "location": { "address": "Vancouver, BC" } }),
            json!({ "id": "d", "status": "active" }),
        ]
        .into_iter()
        .map(|v| Row::from_serialize(&v).unwrap())
        .collect()
    }

    fn ids(rows: &[Row]) -> Vec<&str> {
        rows.iter().filter_map(Row::id).collect()
    }

    #[test]
    fn test_eq_and_range() {
        let data = rows();
        let select = Select::all()
            .filter(Filter::eq("status", "active"))
            .filter(Filter::gte("price", 500))
            .filter(Filter::lte("price", 1000));
        assert_eq!(ids(&select.apply(&data)), vec!["a"]);
    }

    #[test]
    fn test_ilike_on_nested_path() {
        let data = rows();
        let select = Select::all().filter(Filter::ilike("location.address", "on"));
        assert_eq!(ids(&select.apply(&data)), vec!["a", "b"]);
    }

    #[test]
    fn test_or_and_in() {
        let data = rows();
        let select = Select::all().filter(Filter::or(vec![
            Filter::eq("id", "b"),
            Filter::is_in("id", ["c", "z"]),
        ]));
        assert_eq!(ids(&select.apply(&data)), vec!["b", "c"]);
    }

    #[test]
    fn test_neq_matches_missing_column() {
        let data = rows();
        let select = Select::all().filter(Filter::neq("price", 600));
        assert_eq!(ids(&select.apply(&data)), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_ordering_puts_missing_last() {
        let data = rows();
        let asc = Select::all().order_by("price", true);
        assert_eq!(ids(&asc.apply(&data)), vec!["b", "a", "c", "d"]);

        let desc = Select::all().order_by("price", false);
        assert_eq!(ids(&desc.apply(&data)), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_range_window() {
        let data = rows();
        let select = Select::all().order_by("id", true).range(1, 2);
        assert_eq!(ids(&select.apply(&data)), vec!["b", "c"]);
    }
}
