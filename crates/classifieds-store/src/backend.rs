//! The persistence capability consumed by the marketplace services.

use crate::{Filter, Row, Select, StoreResult};
use async_trait::async_trait;

/// Row storage plus object storage, as provided by the hosted backend.
///
/// Implementations must be shareable across tasks; services hold them as
/// `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Insert a record and return it as stored, including its `id`.
    async fn insert_row(&self, table: &str, record: Row) -> StoreResult<Row>;

    /// Apply `patch` to every row matching all `filters`.
    async fn update_rows(&self, table: &str, filters: &[Filter], patch: Row) -> StoreResult<Vec<Row>>;

    /// Delete every row matching all `filters`, returning the count.
    async fn delete_rows(&self, table: &str, filters: &[Filter]) -> StoreResult<u64>;

    /// Run a select.
    async fn select_rows(&self, table: &str, select: &Select) -> StoreResult<Vec<Row>>;

    /// Store an object and return its storage path.
    async fn upload_file(
        &self,
        bucket: &str,
        path: &str,
        content: &[u8],
        content_type: Option<&str>,
    ) -> StoreResult<String>;

    /// Resolve a storage path to a publicly reachable URL.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    /// Run a select and return the first row, if any.
    async fn select_one(&self, table: &str, select: &Select) -> StoreResult<Option<Row>> {
        let select = select.clone().limit(1);
        Ok(self.select_rows(table, &select).await?.into_iter().next())
    }
}
