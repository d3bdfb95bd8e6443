//! Common types and errors for Tally
//!
//! This crate provides shared data structures used across all Tally components.

pub mod telemetry;
pub mod validate;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use validate::ValidationFailure;

/// Core error types for Tally operations
#[derive(Error, Debug)]
pub enum TallyError {
    #[error("{0}")]
    Validation(ValidationFailure),

    #[error("List not found: {list_id}")]
    NotFound { list_id: String },

    #[error("Item not found: {item_id} in list {list_id}")]
    ItemNotFound { list_id: String, item_id: String },

    #[error("Already a member of list {list_id}")]
    AlreadyMember { list_id: String },

    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Engine is shut down")]
    EngineClosed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<ValidationFailure> for TallyError {
    fn from(f: ValidationFailure) -> Self {
        TallyError::Validation(f)
    }
}

/// A single checklist entry
///
/// `order` is a persisted sort key: items within a list are always kept
/// sorted ascending by it. It is not required to be unique or contiguous,
/// gaps are fine. Ties keep document order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: String,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub done: bool,

    #[serde(default)]
    pub order: i64,
}

/// A named, shared collection of items with a member-id set
///
/// The member set always contains the creator until an explicit leave
/// or delete. Members mutate the list concurrently; the remote store is
/// the system of record and local copies are caches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct List {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub items: Vec<Item>,

    #[serde(default)]
    pub users: Vec<String>,

    /// Optional emoji shown next to the list name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,

    /// Optional theme-color token (one of the reward catalog colors)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl List {
    /// True if `user_id` is in the member set
    pub fn has_member(&self, user_id: &str) -> bool {
        self.users.iter().any(|u| u == user_id)
    }

    /// Look up an item by id
    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == item_id)
    }
}

/// Per-user profile document
///
/// `total_items_created` is the lifetime item-creation counter that
/// drives reward tiers. It only ever goes up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub total_items_created: u64,
}

/// A feedback submission from a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub user_id: String,

    /// Feedback category (bug, idea, other)
    #[serde(rename = "type")]
    pub kind: String,

    pub message: String,

    /// ISO 8601 submission timestamp
    pub timestamp: String,

    pub app_version: String,

    #[serde(default = "default_feedback_status")]
    pub status: String,
}

fn default_feedback_status() -> String {
    "new".to_string()
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TallyError>;

/// Exit code constants for the CLI
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_CONFIG_ERROR: i32 = 101;
