//! Store fixtures for tests

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tally_store::{DocumentStore, MemoryStore, Query, RawDocument, Result, Snapshot, StoreError};
use tokio::sync::broadcast;

/// A memory store preloaded with two lists and a user profile:
///
/// - `lists/groceries-id`: "Groceries" with two items, member `alice`
/// - `lists/trip-id`: "Road Trip" with no items, members `alice`, `bob`
/// - `users/alice`: 5 items created
pub fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_documents(vec![
        (
            "lists",
            "groceries-id",
            json!({
                "name": "Groceries",
                "users": ["alice"],
                "items": [
                    {"id": "aa1", "text": "Milk", "done": false, "order": 0},
                    {"id": "aa2", "text": "Bread", "done": false, "order": 1},
                ],
            }),
        ),
        (
            "lists",
            "trip-id",
            json!({
                "name": "Road Trip",
                "users": ["alice", "bob"],
                "items": [],
            }),
        ),
        (
            "users",
            "alice",
            json!({"userId": "alice", "firstName": "Alice", "totalItemsCreated": 5}),
        ),
    ]))
}

/// Wrapper store whose writes can be made to fail on demand.
///
/// Reads and subscriptions always pass through, so tests can drive the
/// "optimistic local edit diverges, next snapshot corrects it" scenario.
pub struct FlakyStore {
    inner: Arc<MemoryStore>,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &Arc<MemoryStore> {
        &self.inner
    }

    fn check(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated write failure",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<RawDocument>> {
        self.inner.get(collection, id).await
    }

    async fn set(&self, collection: &str, id: &str, fields: Value) -> Result<()> {
        self.check()?;
        self.inner.set(collection, id, fields).await
    }

    async fn merge(&self, collection: &str, id: &str, fields: Value) -> Result<()> {
        self.check()?;
        self.inner.merge(collection, id, fields).await
    }

    async fn increment(&self, collection: &str, id: &str, field: &str, delta: i64) -> Result<i64> {
        self.check()?;
        self.inner.increment(collection, id, field, delta).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.check()?;
        self.inner.delete(collection, id).await
    }

    async fn subscribe(&self, query: Query) -> Result<broadcast::Receiver<Snapshot>> {
        self.inner.subscribe(query).await
    }
}
