//! File-backed document store
//!
//! A [`MemoryStore`] whose contents are loaded from and flushed to a JSON
//! file, so CLI invocations share state between runs. Flushing happens
//! after every mutation; a crash loses at most the in-flight write.

use crate::doc::{RawDocument, Snapshot};
use crate::memory::MemoryStore;
use crate::query::Query;
use crate::store::DocumentStore;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;

/// JSON-file-persisted implementation of [`DocumentStore`]
pub struct FileStore {
    inner: MemoryStore,
    path: PathBuf,
}

impl FileStore {
    /// Open a store at `path`, creating an empty one if the file is missing
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = MemoryStore::new();

        if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let data: Value = serde_json::from_str(&raw)?;
            inner.import(data).await?;
            tracing::debug!("loaded store from {:?}", path);
        }

        Ok(Self { inner, path })
    }

    async fn flush(&self) -> Result<()> {
        let dump = self.inner.export().await;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&dump)?)?;
        Ok(())
    }

    /// Stop delivering snapshots and fail all subsequent operations
    pub async fn close(&self) {
        self.inner.close().await;
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<RawDocument>> {
        self.inner.get(collection, id).await
    }

    async fn set(&self, collection: &str, id: &str, fields: Value) -> Result<()> {
        self.inner.set(collection, id, fields).await?;
        self.flush().await
    }

    async fn merge(&self, collection: &str, id: &str, fields: Value) -> Result<()> {
        self.inner.merge(collection, id, fields).await?;
        self.flush().await
    }

    async fn increment(&self, collection: &str, id: &str, field: &str, delta: i64) -> Result<i64> {
        let next = self.inner.increment(collection, id, field, delta).await?;
        self.flush().await?;
        Ok(next)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.inner.delete(collection, id).await?;
        self.flush().await
    }

    async fn subscribe(&self, query: Query) -> Result<broadcast::Receiver<Snapshot>> {
        self.inner.subscribe(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let temp = assert_fs::TempDir::new().unwrap();
        let path = temp.path().join("store.json");

        {
            let store = FileStore::open(&path).await.unwrap();
            store
                .set("lists", "l1", json!({"name": "Groceries", "users": ["u1"]}))
                .await
                .unwrap();
        }

        let reopened = FileStore::open(&path).await.unwrap();
        let doc = reopened.get("lists", "l1").await.unwrap().unwrap();
        assert_eq!(doc.field("name"), Some(&json!("Groceries")));
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let temp = assert_fs::TempDir::new().unwrap();
        let store = FileStore::open(temp.path().join("fresh.json")).await.unwrap();
        assert!(store.get("lists", "l1").await.unwrap().is_none());
    }
}
