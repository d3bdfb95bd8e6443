//! Engine command and event types

use tally_common::{Item, List, Result};
use tokio::sync::oneshot;

use crate::rewards::RewardStatus;

/// Session lifecycle of the engine task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Subscribing,
    /// Re-entered on every snapshot push
    Synced,
}

/// Events broadcast to presentation-layer subscribers
///
/// Remote-write failures in every mutation path land here in addition to
/// the mutation's own `Result`, so passive observers never miss one.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A snapshot push replaced the observed collection
    Synced { lists: usize },

    /// A remote write or read failed after the optimistic local mutation
    RemoteError { op: &'static str, message: String },

    /// The items-created counter crossed into a new tier
    RewardUnlocked { tier_id: String },

    /// The engine task ended
    Closed,
}

/// Point-in-time engine lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStatus {
    pub state: SessionState,
    /// True until the first snapshot is delivered or the subscription errors
    pub loading: bool,
}

/// Mutation and query commands sent from [`EngineHandle`] to the engine task
#[derive(Debug)]
pub enum EngineCommand {
    CreateList {
        name: String,
        reply: oneshot::Sender<Result<List>>,
    },
    JoinList {
        code: String,
        reply: oneshot::Sender<Result<List>>,
    },
    RenameList {
        list_id: String,
        name: String,
        reply: oneshot::Sender<Result<()>>,
    },
    SetTheme {
        list_id: String,
        emoji: Option<String>,
        color: Option<String>,
        reply: oneshot::Sender<Result<()>>,
    },
    AddItem {
        list_id: String,
        text: String,
        reply: oneshot::Sender<Result<Item>>,
    },
    UpdateItems {
        list_id: String,
        items: Vec<Item>,
        reply: oneshot::Sender<Result<()>>,
    },
    SetDone {
        list_id: String,
        item_id: String,
        done: bool,
        reply: oneshot::Sender<Result<()>>,
    },
    DeleteItem {
        list_id: String,
        item_id: String,
        reply: oneshot::Sender<Result<()>>,
    },
    DeleteList {
        list_id: String,
        reply: oneshot::Sender<Result<()>>,
    },
    LeaveList {
        list_id: String,
        reply: oneshot::Sender<Result<()>>,
    },
    SubmitFeedback {
        kind: String,
        message: String,
        reply: oneshot::Sender<Result<()>>,
    },
    Lists {
        reply: oneshot::Sender<Vec<List>>,
    },
    Status {
        reply: oneshot::Sender<EngineStatus>,
    },
    RewardStatus {
        reply: oneshot::Sender<RewardStatus>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}
