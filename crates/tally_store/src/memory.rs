//! In-memory document store
//!
//! Backs tests and single-process sessions. All operations go through one
//! `RwLock`, which makes `increment` atomic and keeps snapshot delivery
//! ordered with respect to writes.

use crate::doc::{RawDocument, Snapshot};
use crate::query::Query;
use crate::store::DocumentStore;
use crate::{Result, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::{broadcast, RwLock};

/// Snapshot channel depth per subscription
const SNAPSHOT_CAPACITY: usize = 64;

type Collections = HashMap<String, BTreeMap<String, Value>>;

struct Watcher {
    query: Query,
    sender: broadcast::Sender<Snapshot>,
}

struct Inner {
    collections: Collections,
    watchers: Vec<Watcher>,
    closed: bool,
}

/// In-memory implementation of [`DocumentStore`]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                collections: HashMap::new(),
                watchers: Vec::new(),
                closed: false,
            }),
        }
    }

    /// Build a store preloaded with documents, typically for tests
    pub fn with_documents(docs: Vec<(&str, &str, Value)>) -> Self {
        let mut collections: Collections = HashMap::new();
        for (collection, id, fields) in docs {
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), fields);
        }
        Self {
            inner: RwLock::new(Inner {
                collections,
                watchers: Vec::new(),
                closed: false,
            }),
        }
    }

    /// Stop delivering snapshots and fail all subsequent operations
    pub async fn close(&self) {
        let mut inner = self.inner.write().await;
        inner.closed = true;
        inner.watchers.clear();
    }

    /// Dump all collections, used by the file-backed store to persist
    pub async fn export(&self) -> Value {
        let inner = self.inner.read().await;
        let mut out = serde_json::Map::new();
        for (name, docs) in &inner.collections {
            let col: serde_json::Map<String, Value> =
                docs.iter().map(|(id, f)| (id.clone(), f.clone())).collect();
            out.insert(name.clone(), Value::Object(col));
        }
        Value::Object(out)
    }

    /// Replace all collections from a previously exported dump
    pub async fn import(&self, data: Value) -> Result<()> {
        let Value::Object(cols) = data else {
            return Err(StoreError::InvalidDocument(
                "expected an object of collections".to_string(),
            ));
        };

        let mut collections: Collections = HashMap::new();
        for (name, docs) in cols {
            let Value::Object(docs) = docs else {
                return Err(StoreError::InvalidDocument(format!(
                    "collection {} is not an object",
                    name
                )));
            };
            collections.insert(name, docs.into_iter().collect());
        }

        let mut inner = self.inner.write().await;
        inner.collections = collections;
        notify(&mut inner, None);
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn evaluate(collections: &Collections, query: &Query) -> Snapshot {
    let documents = collections
        .get(&query.collection)
        .map(|docs| {
            docs.iter()
                .filter(|(_, fields)| query.matches(fields))
                .map(|(id, fields)| RawDocument::new(id.clone(), fields.clone()))
                .collect()
        })
        .unwrap_or_default();
    Snapshot::new(documents)
}

/// Re-run the live queries over the changed collection and push fresh
/// result sets. `None` means every collection changed (import).
/// Watchers with no remaining receivers are pruned here.
fn notify(inner: &mut Inner, changed: Option<&str>) {
    let collections = &inner.collections;
    inner.watchers.retain(|w| {
        if w.sender.receiver_count() == 0 {
            return false;
        }
        if changed.is_some_and(|c| c != w.query.collection) {
            return true;
        }
        let snapshot = evaluate(collections, &w.query);
        // A send only fails when the last receiver dropped between the
        // count check and here; the watcher is pruned on the next pass.
        let _ = w.sender.send(snapshot);
        true
    });
}

fn ensure_open(inner: &Inner) -> Result<()> {
    if inner.closed {
        return Err(StoreError::Closed);
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<RawDocument>> {
        let inner = self.inner.read().await;
        ensure_open(&inner)?;
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| RawDocument::new(id, fields.clone())))
    }

    async fn set(&self, collection: &str, id: &str, fields: Value) -> Result<()> {
        if !fields.is_object() {
            return Err(StoreError::InvalidDocument(
                "document fields must be an object".to_string(),
            ));
        }
        let mut inner = self.inner.write().await;
        ensure_open(&inner)?;
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
        tracing::debug!("set {}/{}", collection, id);
        notify(&mut inner, Some(collection));
        Ok(())
    }

    async fn merge(&self, collection: &str, id: &str, fields: Value) -> Result<()> {
        let Value::Object(patch) = fields else {
            return Err(StoreError::InvalidDocument(
                "merge fields must be an object".to_string(),
            ));
        };
        let mut inner = self.inner.write().await;
        ensure_open(&inner)?;
        let doc = inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if let Value::Object(existing) = doc {
            for (k, v) in patch {
                existing.insert(k, v);
            }
        }
        tracing::debug!("merge {}/{}", collection, id);
        notify(&mut inner, Some(collection));
        Ok(())
    }

    async fn increment(&self, collection: &str, id: &str, field: &str, delta: i64) -> Result<i64> {
        let mut inner = self.inner.write().await;
        ensure_open(&inner)?;
        let doc = inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        let Value::Object(existing) = doc else {
            return Err(StoreError::InvalidDocument(format!(
                "{}/{} is not an object",
                collection, id
            )));
        };
        let current = existing.get(field).and_then(Value::as_i64).unwrap_or(0);
        let next = current + delta;
        existing.insert(field.to_string(), Value::from(next));
        tracing::debug!("increment {}/{}.{} -> {}", collection, id, field, next);
        notify(&mut inner, Some(collection));
        Ok(next)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        ensure_open(&inner)?;
        let removed = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        if removed {
            tracing::debug!("delete {}/{}", collection, id);
            notify(&mut inner, Some(collection));
        }
        Ok(())
    }

    async fn subscribe(&self, query: Query) -> Result<broadcast::Receiver<Snapshot>> {
        let mut inner = self.inner.write().await;
        ensure_open(&inner)?;
        let (sender, receiver) = broadcast::channel(SNAPSHOT_CAPACITY);
        let initial = evaluate(&inner.collections, &query);
        // The receiver already exists, so the initial send cannot fail
        let _ = sender.send(initial);
        inner.watchers.push(Watcher { query, sender });
        tracing::debug!("subscription opened ({} live)", inner.watchers.len());
        Ok(receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let store = MemoryStore::new();
        store
            .set("lists", "l1", json!({"name": "Groceries", "users": ["u1"]}))
            .await
            .unwrap();

        let doc = store.get("lists", "l1").await.unwrap().unwrap();
        assert_eq!(doc.field("name"), Some(&json!("Groceries")));
        assert!(store.get("lists", "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_merge_preserves_other_fields() {
        let store = MemoryStore::new();
        store
            .set("lists", "l1", json!({"name": "Groceries", "users": ["u1"]}))
            .await
            .unwrap();
        store
            .merge("lists", "l1", json!({"name": "Food"}))
            .await
            .unwrap();

        let doc = store.get("lists", "l1").await.unwrap().unwrap();
        assert_eq!(doc.field("name"), Some(&json!("Food")));
        assert_eq!(doc.field("users"), Some(&json!(["u1"])));
    }

    #[tokio::test]
    async fn test_increment_from_missing_field() {
        let store = MemoryStore::new();
        assert_eq!(
            store.increment("users", "u1", "totalItemsCreated", 1).await.unwrap(),
            1
        );
        assert_eq!(
            store.increment("users", "u1", "totalItemsCreated", 1).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_subscribe_initial_and_update() {
        let store = MemoryStore::new();
        store
            .set("lists", "l1", json!({"name": "A", "users": ["u1"]}))
            .await
            .unwrap();

        let mut rx = store
            .subscribe(Query::array_contains("lists", "users", "u1"))
            .await
            .unwrap();

        let initial = rx.recv().await.unwrap();
        assert_eq!(initial.len(), 1);

        store
            .set("lists", "l2", json!({"name": "B", "users": ["u1", "u2"]}))
            .await
            .unwrap();
        let next = rx.recv().await.unwrap();
        assert_eq!(next.len(), 2);
    }

    #[tokio::test]
    async fn test_subscribe_filters_by_membership() {
        let store = MemoryStore::new();
        store
            .set("lists", "l1", json!({"name": "A", "users": ["u1"]}))
            .await
            .unwrap();
        store
            .set("lists", "l2", json!({"name": "B", "users": ["u2"]}))
            .await
            .unwrap();

        let mut rx = store
            .subscribe(Query::array_contains("lists", "users", "u2"))
            .await
            .unwrap();
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.documents[0].id, "l2");
    }

    #[tokio::test]
    async fn test_closed_store_rejects_operations() {
        let store = MemoryStore::new();
        store.close().await;

        let err = store.get("lists", "l1").await.unwrap_err();
        assert!(matches!(err, StoreError::Closed));
    }

    #[tokio::test]
    async fn test_export_import_roundtrip() {
        let store = MemoryStore::new();
        store
            .set("lists", "l1", json!({"name": "A", "users": ["u1"]}))
            .await
            .unwrap();

        let dump = store.export().await;
        let other = MemoryStore::new();
        other.import(dump).await.unwrap();

        let doc = other.get("lists", "l1").await.unwrap().unwrap();
        assert_eq!(doc.field("name"), Some(&json!("A")));
    }
}
