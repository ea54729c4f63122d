//! In-memory backend with fault injection.

use crate::{Backend, Filter, Row, Select, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

const DEFAULT_PUBLIC_BASE: &str = "http://localhost:54321";

/// Serializable table contents, used to persist a backend between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Rows keyed by table name.
    pub tables: BTreeMap<String, Vec<Row>>,
}

/// Number of calls made per capability operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub inserts: u64,
    pub updates: u64,
    pub deletes: u64,
    pub selects: u64,
    pub uploads: u64,
}

impl CallCounts {
    /// Total number of capability calls.
    pub fn total(&self) -> u64 {
        self.inserts + self.updates + self.deletes + self.selects + self.uploads
    }
}

#[derive(Debug, Default)]
struct Counters {
    inserts: AtomicU64,
    updates: AtomicU64,
    deletes: AtomicU64,
    selects: AtomicU64,
    uploads: AtomicU64,
}

#[derive(Debug, Default)]
struct Faults {
    offline: bool,
    failing_uploads: HashSet<String>,
    upload_delays: HashMap<String, Duration>,
    failing_tables: HashSet<String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: HashMap<String, Vec<Row>>,
    objects: HashMap<String, StoredObject>,
    faults: Faults,
}

/// An uploaded object.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub content: Vec<u8>,
    pub content_type: Option<String>,
}

/// A complete [`Backend`] held in memory.
///
/// Assigns `id`, `created_at` and `updated_at` on insert, enforces
/// registered unique constraints, and can be told to fail specific calls.
#[derive(Debug)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
    unique: HashMap<String, Vec<Vec<String>>>,
    public_base_url: String,
    counters: Counters,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            unique: HashMap::new(),
            public_base_url: DEFAULT_PUBLIC_BASE.to_string(),
            counters: Counters::default(),
        }
    }

    /// Restore tables from a snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let backend = Self::new();
        let tables = snapshot.tables.into_iter().collect();
        Self {
            state: RwLock::new(MemoryState {
                tables,
                ..MemoryState::default()
            }),
            ..backend
        }
    }

    /// Set the base used by [`Backend::public_url`].
    pub fn with_public_base_url(mut self, base: impl Into<String>) -> Self {
        self.public_base_url = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Register a unique constraint over `columns` of `table`.
    pub fn with_unique(mut self, table: &str, columns: &[&str]) -> Self {
        self.unique
            .entry(table.to_string())
            .or_default()
            .push(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Make every call fail as if the backend were unreachable.
    pub async fn set_offline(&self, offline: bool) {
        self.state.write().await.faults.offline = offline;
    }

    /// Fail uploads whose path contains `needle`.
    pub async fn fail_uploads_matching(&self, needle: impl Into<String>) {
        self.state.write().await.faults.failing_uploads.insert(needle.into());
    }

    /// Delay uploads whose path contains `needle`.
    pub async fn delay_uploads_matching(&self, needle: impl Into<String>, delay: Duration) {
        self.state
            .write()
            .await
            .faults
            .upload_delays
            .insert(needle.into(), delay);
    }

    /// Fail every write to `table`.
    pub async fn fail_writes_to(&self, table: impl Into<String>) {
        self.state.write().await.faults.failing_tables.insert(table.into());
    }

    /// Clear all injected faults.
    pub async fn clear_faults(&self) {
        self.state.write().await.faults = Faults::default();
    }

    /// Capability calls made so far, including failed ones.
    pub fn calls(&self) -> CallCounts {
        CallCounts {
            inserts: self.counters.inserts.load(Ordering::SeqCst),
            updates: self.counters.updates.load(Ordering::SeqCst),
            deletes: self.counters.deletes.load(Ordering::SeqCst),
            selects: self.counters.selects.load(Ordering::SeqCst),
            uploads: self.counters.uploads.load(Ordering::SeqCst),
        }
    }

    /// All rows currently in `table`, in insertion order.
    pub async fn rows(&self, table: &str) -> Vec<Row> {
        self.state
            .read()
            .await
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Fetch a stored object.
    pub async fn object(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.state.read().await.objects.get(&object_key(bucket, path)).cloned()
    }

    /// Number of stored objects across all buckets.
    pub async fn object_count(&self) -> usize {
        self.state.read().await.objects.len()
    }

    /// Copy out all tables.
    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.read().await;
        Snapshot {
            tables: state
                .tables
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Replace all tables with `snapshot`. Objects and faults are kept.
    pub async fn restore(&self, snapshot: Snapshot) {
        self.state.write().await.tables = snapshot.tables.into_iter().collect();
    }

    fn check_unique(&self, table: &str, rows: &[Row], candidate: &Row, skip_id: Option<&str>) -> StoreResult<()> {
        let Some(constraints) = self.unique.get(table) else {
            return Ok(());
        };
        for columns in constraints {
            let clash = rows.iter().any(|existing| {
                skip_id.map_or(true, |id| existing.id() != Some(id))
                    && columns
                        .iter()
                        .all(|c| existing.get(c).is_some() && existing.get(c) == candidate.get(c))
            });
            if clash {
                return Err(StoreError::Conflict {
                    table: table.to_string(),
                    columns: columns.join(", "),
                });
            }
        }
        Ok(())
    }
}

fn object_key(bucket: &str, path: &str) -> String {
    format!("{}/{}", bucket, path)
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn unavailable() -> StoreError {
    StoreError::Unavailable("backend is offline".to_string())
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn insert_row(&self, table: &str, mut record: Row) -> StoreResult<Row> {
        self.counters.inserts.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;
        if state.faults.offline {
            return Err(unavailable());
        }
        if state.faults.failing_tables.contains(table) {
            return Err(StoreError::Rejected(format!("insert into {} failed", table)));
        }

        if !record.contains("id") {
            record.set("id", uuid::Uuid::new_v4().to_string());
        }
        let now = now_timestamp();
        if !record.contains("created_at") {
            record.set("created_at", now.clone());
        }
        record.set("updated_at", now);

        let rows = state.tables.entry(table.to_string()).or_default();
        self.check_unique(table, rows, &record, None)?;
        rows.push(record.clone());
        tracing::debug!(table, id = record.id().unwrap_or_default(), "row inserted");
        Ok(record)
    }

    async fn update_rows(&self, table: &str, filters: &[Filter], patch: Row) -> StoreResult<Vec<Row>> {
        self.counters.updates.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;
        if state.faults.offline {
            return Err(unavailable());
        }
        if state.faults.failing_tables.contains(table) {
            return Err(StoreError::Rejected(format!("update of {} failed", table)));
        }

        let now = now_timestamp();
        let Some(rows) = state.tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        // Patch a copy so a conflict on any row leaves the table untouched.
        let mut next = rows.clone();
        let mut updated = Vec::new();
        for i in 0..next.len() {
            if !filters.iter().all(|f| f.matches(&next[i])) {
                continue;
            }
            let mut candidate = next[i].clone();
            candidate.merge(&patch);
            candidate.set("updated_at", now.clone());
            let id = next[i].id().map(str::to_string);
            self.check_unique(table, &next, &candidate, id.as_deref())?;
            next[i] = candidate.clone();
            updated.push(candidate);
        }
        *rows = next;
        Ok(updated)
    }

    async fn delete_rows(&self, table: &str, filters: &[Filter]) -> StoreResult<u64> {
        self.counters.deletes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;
        if state.faults.offline {
            return Err(unavailable());
        }
        if state.faults.failing_tables.contains(table) {
            return Err(StoreError::Rejected(format!("delete from {} failed", table)));
        }

        let Some(rows) = state.tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !filters.iter().all(|f| f.matches(r)));
        Ok((before - rows.len()) as u64)
    }

    async fn select_rows(&self, table: &str, select: &Select) -> StoreResult<Vec<Row>> {
        self.counters.selects.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;
        if state.faults.offline {
            return Err(unavailable());
        }
        Ok(state
            .tables
            .get(table)
            .map(|rows| select.apply(rows))
            .unwrap_or_default())
    }

    async fn upload_file(
        &self,
        bucket: &str,
        path: &str,
        content: &[u8],
        content_type: Option<&str>,
    ) -> StoreResult<String> {
        self.counters.uploads.fetch_add(1, Ordering::SeqCst);

        let delay = {
            let state = self.state.read().await;
            if state.faults.offline {
                return Err(unavailable());
            }
            state
                .faults
                .upload_delays
                .iter()
                .find(|(needle, _)| path.contains(needle.as_str()))
                .map(|(_, d)| *d)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.write().await;
        if state
            .faults
            .failing_uploads
            .iter()
            .any(|needle| path.contains(needle.as_str()))
        {
            return Err(StoreError::Rejected(format!("upload of {} failed", path)));
        }

        let key = object_key(bucket, path);
        if state.objects.contains_key(&key) {
            return Err(StoreError::ObjectExists(key));
        }
        state.objects.insert(
            key,
            StoredObject {
                content: content.to_vec(),
                content_type: content_type.map(str::to_string),
            },
        );
        tracing::debug!(bucket, path, bytes = content.len(), "object stored");
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.public_base_url, bucket, path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        Row::from_serialize(&value).unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let backend = MemoryBackend::new();
        let stored = backend
            .insert_row("listings", row(json!({ "title": "Bike" })))
            .await
            .unwrap();
        assert!(stored.id().is_some());
        assert!(stored.get("created_at").is_some());
        assert_eq!(backend.rows("listings").await.len(), 1);
        assert_eq!(backend.calls().inserts, 1);
    }

    #[tokio::test]
    async fn test_unique_constraint() {
        let backend = MemoryBackend::new().with_unique("favorites", &["user_id", "product_id"]);
        let fav = json!({ "user_id": "u1", "product_id": "p1" });
        backend.insert_row("favorites", row(fav.clone())).await.unwrap();
        let err = backend.insert_row("favorites", row(fav)).await.unwrap_err();
        assert!(err.is_conflict());

        backend
            .insert_row("favorites", row(json!({ "user_id": "u1", "product_id": "p2" })))
            .await
            .unwrap();
        assert_eq!(backend.rows("favorites").await.len(), 2);
    }

    #[tokio::test]
    async fn test_conflicting_update_changes_nothing() {
        let backend = MemoryBackend::new().with_unique("favorites", &["user_id", "product_id"]);
        for (user, product) in [("u1", "p1"), ("u2", "p1"), ("u1", "p2")] {
            backend
                .insert_row("favorites", row(json!({ "user_id": user, "product_id": product })))
                .await
                .unwrap();
        }

        let mut patch = Row::new();
        patch.set("user_id", "u3");
        let err = backend
            .update_rows("favorites", &[Filter::eq("product_id", "p1")], patch)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        let rows = backend.rows("favorites").await;
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.get("user_id") != Some(&json!("u3"))));
    }

    #[tokio::test]
    async fn test_restore_rolls_back_tables() {
        let backend = MemoryBackend::new();
        backend.insert_row("listings", row(json!({ "title": "Bike" }))).await.unwrap();
        let before = backend.snapshot().await;

        backend.insert_row("listings", row(json!({ "title": "Sofa" }))).await.unwrap();
        backend.upload_file("b", "a.jpg", b"x", None).await.unwrap();
        backend.restore(before).await;

        let rows = backend.rows("listings").await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("title"), Some(&json!("Bike")));
        assert_eq!(backend.object_count().await, 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let backend = MemoryBackend::new();
        backend.insert_row("messages", row(json!({ "id": "m1", "read": false }))).await.unwrap();
        backend.insert_row("messages", row(json!({ "id": "m2", "read": false }))).await.unwrap();

        let mut patch = Row::new();
        patch.set("read", true);
        let updated = backend
            .update_rows("messages", &[Filter::eq("id", "m1")], patch)
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].get("read"), Some(&json!(true)));

        let deleted = backend
            .delete_rows("messages", &[Filter::eq("read", false)])
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(backend.rows("messages").await.len(), 1);
    }

    #[tokio::test]
    async fn test_upload_and_public_url() {
        let backend = MemoryBackend::new().with_public_base_url("https://cdn.example.com/");
        let path = backend
            .upload_file("listing-images", "1-0-a.jpg", b"jpeg", Some("image/jpeg"))
            .await
            .unwrap();
        assert_eq!(path, "1-0-a.jpg");
        assert_eq!(
            backend.public_url("listing-images", &path),
            "https://cdn.example.com/storage/v1/object/public/listing-images/1-0-a.jpg"
        );
        let object = backend.object("listing-images", &path).await.unwrap();
        assert_eq!(object.content, b"jpeg".to_vec());

        let err = backend
            .upload_file("listing-images", "1-0-a.jpg", b"again", None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ObjectExists(_)));
    }

    #[tokio::test]
    async fn test_offline_fails_everything() {
        let backend = MemoryBackend::new();
        backend.set_offline(true).await;
        assert!(backend.insert_row("t", Row::new()).await.unwrap_err().is_unavailable());
        assert!(backend.select_rows("t", &Select::all()).await.unwrap_err().is_unavailable());
        assert!(backend
            .upload_file("b", "p", b"x", None)
            .await
            .unwrap_err()
            .is_unavailable());

        backend.clear_faults().await;
        assert!(backend.select_rows("t", &Select::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let backend = MemoryBackend::new();
        backend.insert_row("listings", row(json!({ "id": "l1" }))).await.unwrap();
        let restored = MemoryBackend::from_snapshot(backend.snapshot().await);
        let rows = restored.rows("listings").await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id(), Some("l1"));
    }
}
