//! Local user-profile cache
//!
//! Holds the cached display name and items-created counter for instant
//! reads. The cache is explicit and injected into the engine, never
//! ambient state: it is seeded once from the remote profile document
//! (read-through) and bumped optimistically on every successful item
//! creation ahead of the authoritative server-side increment
//! (write-through).

use serde_json::Value;
use tally_store::RawDocument;

#[derive(Debug, Clone)]
pub struct ProfileCache {
    user_id: String,
    display_name: Option<String>,
    items_created: u64,
}

impl ProfileCache {
    /// An empty cache for a user with no profile document yet
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
            items_created: 0,
        }
    }

    /// Seed the cache from the remote profile document
    pub fn from_document(user_id: impl Into<String>, doc: &RawDocument) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: doc
                .field("firstName")
                .and_then(Value::as_str)
                .map(str::to_string),
            items_created: doc
                .field("totalItemsCreated")
                .and_then(Value::as_u64)
                .unwrap_or(0),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn items_created(&self) -> u64 {
        self.items_created
    }

    /// Optimistic bump, called when an item was created locally.
    /// Returns the new cached value.
    pub fn record_item_created(&mut self) -> u64 {
        self.items_created += 1;
        self.items_created
    }

    /// Authoritative value from the store, wins over the optimistic bump
    pub fn set_items_created(&mut self, count: u64) {
        self.items_created = count;
    }

    pub fn set_display_name(&mut self, name: Option<String>) {
        self.display_name = name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seed_from_document() {
        let doc = RawDocument::new(
            "u1",
            json!({"firstName": "Ada", "totalItemsCreated": 42, "userId": "u1"}),
        );
        let cache = ProfileCache::from_document("u1", &doc);

        assert_eq!(cache.display_name(), Some("Ada"));
        assert_eq!(cache.items_created(), 42);
    }

    #[test]
    fn test_seed_tolerates_missing_fields() {
        let cache = ProfileCache::from_document("u1", &RawDocument::new("u1", json!({})));
        assert_eq!(cache.display_name(), None);
        assert_eq!(cache.items_created(), 0);
    }

    #[test]
    fn test_optimistic_bump_then_authoritative() {
        let mut cache = ProfileCache::empty("u1");

        assert_eq!(cache.record_item_created(), 1);
        assert_eq!(cache.record_item_created(), 2);

        // authoritative fetch wins
        cache.set_items_created(7);
        assert_eq!(cache.items_created(), 7);
    }
}
