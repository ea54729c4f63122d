//! On-disk backend for local use.
//!
//! Rows live in `<data_dir>/tables.json` and uploaded objects under
//! `<data_dir>/objects/<bucket>/`. Every write rewrites the table file.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use classifieds_core::tables;
use classifieds_store::{Backend, Filter, MemoryBackend, Row, Select, Snapshot, StoreError, StoreResult};

const TABLES_FILE: &str = "tables.json";

/// A [`MemoryBackend`] persisted to a directory.
pub struct LocalBackend {
    inner: MemoryBackend,
    root: PathBuf,
    file_urls: bool,
}

impl LocalBackend {
    /// Open (or create) the data directory at `root`.
    pub async fn open(root: impl Into<PathBuf>, public_base_url: Option<&str>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("Failed to create data directory: {}", root.display()))?;

        let tables_path = root.join(TABLES_FILE);
        let snapshot = match tokio::fs::read(&tables_path).await {
            Ok(bytes) => serde_json::from_slice::<Snapshot>(&bytes)
                .with_context(|| format!("Failed to parse {}", tables_path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", tables_path.display()))
            }
        };
        tracing::debug!(root = %root.display(), tables = snapshot.tables.len(), "local backend opened");

        let mut inner = tables::with_schema(MemoryBackend::from_snapshot(snapshot));
        if let Some(base) = public_base_url {
            inner = inner.with_public_base_url(base);
        }
        Ok(Self {
            inner,
            root,
            file_urls: public_base_url.is_none(),
        })
    }

    fn object_path(&self, bucket: &str, path: &str) -> PathBuf {
        self.root.join("objects").join(bucket).join(path)
    }

    /// Persist after a write, restoring `before` in memory if the file
    /// cannot be written.
    async fn commit(&self, before: Snapshot) -> StoreResult<()> {
        if let Err(e) = self.persist().await {
            tracing::warn!(root = %self.root.display(), error = %e, "persist failed, rolling back");
            self.inner.restore(before).await;
            return Err(e);
        }
        Ok(())
    }

    async fn persist(&self) -> StoreResult<()> {
        let snapshot = self.inner.snapshot().await;
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        let target = self.root.join(TABLES_FILE);
        let staging = self.root.join(format!("{}.tmp", TABLES_FILE));
        tokio::fs::write(&staging, bytes).await.map_err(io_error)?;
        tokio::fs::rename(&staging, &target).await.map_err(io_error)
    }
}

fn io_error(e: std::io::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl Backend for LocalBackend {
    async fn insert_row(&self, table: &str, record: Row) -> StoreResult<Row> {
        let before = self.inner.snapshot().await;
        let row = self.inner.insert_row(table, record).await?;
        self.commit(before).await?;
        Ok(row)
    }

    async fn update_rows(&self, table: &str, filters: &[Filter], patch: Row) -> StoreResult<Vec<Row>> {
        let before = self.inner.snapshot().await;
        let rows = self.inner.update_rows(table, filters, patch).await?;
        if !rows.is_empty() {
            self.commit(before).await?;
        }
        Ok(rows)
    }

    async fn delete_rows(&self, table: &str, filters: &[Filter]) -> StoreResult<u64> {
        let before = self.inner.snapshot().await;
        let removed = self.inner.delete_rows(table, filters).await?;
        if removed > 0 {
            self.commit(before).await?;
        }
        Ok(removed)
    }

    async fn select_rows(&self, table: &str, select: &Select) -> StoreResult<Vec<Row>> {
        self.inner.select_rows(table, select).await
    }

    async fn upload_file(
        &self,
        bucket: &str,
        path: &str,
        content: &[u8],
        content_type: Option<&str>,
    ) -> StoreResult<String> {
        let target = self.object_path(bucket, path);
        if tokio::fs::try_exists(&target).await.map_err(io_error)? {
            return Err(StoreError::ObjectExists(format!("{}/{}", bucket, path)));
        }
        let stored = self.inner.upload_file(bucket, path, content, content_type).await?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(&target, content).await.map_err(io_error)?;
        Ok(stored)
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        if self.file_urls {
            format!("file://{}", self.object_path(bucket, path).display())
        } else {
            self.inner.public_url(bucket, path)
        }
    }
}
