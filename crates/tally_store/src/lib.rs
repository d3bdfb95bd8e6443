//! # Tally Document Store
//!
//! Abstraction over the remote document database the sync engine binds to.
//!
//! ## Architecture
//!
//! - **Documents**: schemaless JSON maps keyed by `(collection, id)`
//! - **Live queries**: a subscription re-delivers the full matching result
//!   set on every underlying change to the watched collection
//! - **Implementations**: [`MemoryStore`] for tests and single-process use,
//!   [`FileStore`] persisting the same state as JSON between runs
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tally_store::{DocumentStore, MemoryStore, Query, collections};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> tally_store::Result<()> {
//!     let store = MemoryStore::new();
//!     store
//!         .set(collections::LISTS, "list-1", json!({"name": "Groceries"}))
//!         .await?;
//!
//!     let mut snapshots = store
//!         .subscribe(Query::array_contains(collections::LISTS, "users", "user-1"))
//!         .await?;
//!     let initial = snapshots.recv().await.unwrap();
//!     println!("{} matching lists", initial.documents.len());
//!     Ok(())
//! }
//! ```

pub mod doc;
pub mod file;
pub mod memory;
pub mod query;
pub mod store;

pub use doc::{RawDocument, Snapshot};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use query::Query;
pub use store::DocumentStore;

/// Collection names used by the application
pub mod collections {
    pub const LISTS: &str = "lists";
    pub const USERS: &str = "users";
    pub const FEEDBACK: &str = "feedback";
}

/// Common result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Store is closed")]
    Closed,

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
