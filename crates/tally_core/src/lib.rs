//! # Tally List Synchronization Engine
//!
//! Maps a remote, eventually-consistent document store onto a locally
//! observed, ordered, mutable list-of-lists model.
//!
//! ## Architecture
//!
//! - **Reducer loop**: one task merges two input streams, store snapshot
//!   pushes and mutation commands, with snapshots always winning on
//!   conflict. No locking over the observed collections.
//! - **Optimistic mutations**: local state updates immediately, the remote
//!   write follows; a stale snapshot may transiently overwrite an in-flight
//!   edit and the next push corrects it.
//! - **Uniform failure reporting**: every mutation returns a `Result` and
//!   remote failures are additionally broadcast on the engine event channel.
//! - **Rewards**: a lifetime items-created counter unlocks cosmetic color
//!   tiers, derived from a static catalog.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tally_core::ListEngine;
//! use tally_store::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> tally_common::Result<()> {
//!     let store = Arc::new(MemoryStore::new());
//!     let engine = ListEngine::spawn(store, "user-1").await?;
//!
//!     let list = engine.create_list("Groceries").await?;
//!     engine.add_item(&list.id, "Milk").await?;
//!     engine.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod events;
pub mod mapping;
pub mod ordering;
pub mod profile;
pub mod rewards;

pub use engine::{EngineHandle, ListEngine};
pub use events::{EngineEvent, EngineStatus, SessionState};
pub use profile::ProfileCache;
pub use rewards::{RewardStatus, RewardTier, RewardTracker, CATALOG};
