//! Raw document and snapshot types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A schemaless document as stored: an id plus a JSON object of fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawDocument {
    pub id: String,
    pub fields: Value,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, fields: Value) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Fetch a field by name, if present
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// The full result set of a live query at one point in time
///
/// Consumers replace their local state with the snapshot contents
/// wholesale; a snapshot is never a delta.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub documents: Vec<RawDocument>,
}

impl Snapshot {
    pub fn new(documents: Vec<RawDocument>) -> Self {
        Self { documents }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }
}
