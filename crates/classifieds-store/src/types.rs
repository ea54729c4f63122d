//! Row type and JSON value helpers.

use crate::StoreError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// A single record as stored by the backend.
///
/// Rows are JSON objects. Nested objects (such as a listing's `location`)
/// are addressed with dotted column paths, e.g. `location.address`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a row from any serializable record.
    ///
    /// Fails if the record does not serialize to a JSON object.
    pub fn from_serialize<T: Serialize>(record: &T) -> Result<Self, StoreError> {
        match serde_json::to_value(record)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(StoreError::Serialization(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Get a top-level column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Get a value by dotted path.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.0.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Set a top-level column.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(column.into(), value.into());
    }

    /// Check whether a top-level column is present.
    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// The `id` column as a string, if present.
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// Overwrite columns with those present in `patch`.
    pub fn merge(&mut self, patch: &Row) {
        for (k, v) in &patch.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Column names in this row.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Try to deserialize the row into a type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Consume and return the inner map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Compare two JSON scalars.
///
/// Numbers compare numerically (`600` equals `600.0`), strings
/// lexicographically, booleans false-before-true. Mixed or non-scalar
/// values are incomparable.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

/// Equality with numeric coercion.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare_values(a, b) == Some(Ordering::Equal),
        _ => a == b,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Point {
        x: i64,
        label: String,
    }

    #[test]
    fn test_row_from_serialize() {
        let row = Row::from_serialize(&Point { x: 3, label: "a".into() }).unwrap();
        assert_eq!(row.get("x"), Some(&json!(3)));
        let back: Point = row.deserialize().unwrap();
        assert_eq!(back.label, "a");
    }

    #[test]
    fn test_row_rejects_non_object() {
        let err = Row::from_serialize(&vec![1, 2]).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn test_get_path() {
        let row = Row::from_serialize(&json!({
            "location": { "address": "Toronto, ON" }
        }))
        .unwrap();
        assert_eq!(row.get_path("location.address"), Some(&json!("Toronto, ON")));
        assert_eq!(row.get_path("location.city"), None);
        assert_eq!(row.get_path("missing.address"), None);
    }

    #[test]
    fn test_merge() {
        let mut row = Row::from_serialize(&json!({ "status": "active", "price": 10 })).unwrap();
        let mut patch = Row::new();
        patch.set("status", "sold");
        row.merge(&patch);
        assert_eq!(row.get("status"), Some(&json!("sold")));
        assert_eq!(row.get("price"), Some(&json!(10)));
    }

    #[test]
    fn test_numeric_equality() {
        assert!(values_equal(&json!(600), &json!(600.0)));
        assert!(!values_equal(&json!("600"), &json!(600)));
        assert_eq!(compare_values(&json!("a"), &json!(1)), None);
    }
}
