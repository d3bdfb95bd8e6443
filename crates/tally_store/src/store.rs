//! The document store contract

use crate::doc::{RawDocument, Snapshot};
use crate::query::Query;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

/// Contract implemented by every document store backend
///
/// Writes are last-writer-wins: there is no merge of concurrent edits to
/// the same field beyond shallow field-level `merge`. Subscriptions are
/// push-based full-replace snapshots; the first snapshot is delivered
/// immediately after `subscribe` returns.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read of one document
    async fn get(&self, collection: &str, id: &str) -> Result<Option<RawDocument>>;

    /// Whole-document write, creating or replacing
    async fn set(&self, collection: &str, id: &str, fields: Value) -> Result<()>;

    /// Shallow field merge into an existing document, creating it if absent
    async fn merge(&self, collection: &str, id: &str, fields: Value) -> Result<()>;

    /// Atomic integer increment of one field, treating a missing field as 0.
    /// Returns the new value.
    async fn increment(&self, collection: &str, id: &str, field: &str, delta: i64) -> Result<i64>;

    /// Delete one document. Deleting a missing document is a no-op.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;

    /// Open a live query. The current result set is delivered immediately,
    /// then the full result set is re-delivered on every change to the
    /// watched collection. Delivery stops when the receiver is dropped.
    async fn subscribe(&self, query: Query) -> Result<broadcast::Receiver<Snapshot>>;
}
