//! Mapping between raw store documents and typed entities
//!
//! Raw documents come from a schemaless store, so every field read is
//! tolerant: missing or malformed item fields default to `text=""`,
//! `done=false`, `order=0`; a non-array `users` maps to an empty member
//! set. Items are sorted ascending by `order` after mapping.

use crate::ordering;
use serde_json::{json, Value};
use tally_common::{Item, List};
use tally_store::RawDocument;

/// Map one raw list document to a typed `List`
pub fn map_list(doc: &RawDocument) -> List {
    let name = doc
        .field("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let users = doc
        .field("users")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    let mut items: Vec<Item> = doc
        .field("items")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().map(map_item).collect())
        .unwrap_or_default();
    ordering::sort_by_order(&mut items);

    let emoji = doc
        .field("emoji")
        .and_then(Value::as_str)
        .map(str::to_string);
    let color = doc
        .field("color")
        .and_then(Value::as_str)
        .map(str::to_string);

    List {
        id: doc.id.clone(),
        name,
        items,
        users,
        emoji,
        color,
    }
}

fn map_item(value: &Value) -> Item {
    Item {
        id: value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        text: value
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        done: value.get("done").and_then(Value::as_bool).unwrap_or(false),
        order: value.get("order").and_then(Value::as_i64).unwrap_or(0),
    }
}

/// Document fields for a whole-list write. The id lives in the document
/// key, not in the fields.
pub fn list_fields(list: &List) -> Value {
    let mut fields = json!({
        "name": list.name,
        "items": items_field(&list.items),
        "users": list.users,
    });
    if let Some(emoji) = &list.emoji {
        fields["emoji"] = json!(emoji);
    }
    if let Some(color) = &list.color {
        fields["color"] = json!(color);
    }
    fields
}

/// The `items` array as stored, used for whole-array item writes
pub fn items_field(items: &[Item]) -> Value {
    json!(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_full_document() {
        let doc = RawDocument::new(
            "l1",
            json!({
                "name": "Groceries",
                "users": ["u1", "u2"],
                "items": [
                    {"id": "b", "text": "Bread", "done": true, "order": 2},
                    {"id": "a", "text": "Milk", "done": false, "order": 0},
                ],
                "emoji": "🛒",
                "color": "teal",
            }),
        );

        let list = map_list(&doc);

        assert_eq!(list.id, "l1");
        assert_eq!(list.name, "Groceries");
        assert_eq!(list.users, vec!["u1", "u2"]);
        // sorted ascending by order
        assert_eq!(list.items[0].id, "a");
        assert_eq!(list.items[1].id, "b");
        assert_eq!(list.emoji.as_deref(), Some("🛒"));
        assert_eq!(list.color.as_deref(), Some("teal"));
    }

    #[test]
    fn test_map_malformed_fields_default() {
        let doc = RawDocument::new(
            "l1",
            json!({
                "name": 42,
                "users": "not-an-array",
                "items": [
                    {"id": "a"},
                    {"id": "b", "text": 7, "done": "yes", "order": "first"},
                ],
            }),
        );

        let list = map_list(&doc);

        assert_eq!(list.name, "");
        assert!(list.users.is_empty());
        assert_eq!(list.items.len(), 2);
        for item in &list.items {
            assert_eq!(item.text, "");
            assert!(!item.done);
            assert_eq!(item.order, 0);
        }
    }

    #[test]
    fn test_map_empty_document() {
        let list = map_list(&RawDocument::new("l1", json!({})));
        assert_eq!(list.name, "");
        assert!(list.items.is_empty());
        assert!(list.users.is_empty());
        assert!(list.emoji.is_none());
    }

    #[test]
    fn test_list_fields_omit_id_and_empty_theme() {
        let list = List {
            id: "l1".to_string(),
            name: "Groceries".to_string(),
            items: vec![],
            users: vec!["u1".to_string()],
            emoji: None,
            color: None,
        };

        let fields = list_fields(&list);

        assert!(fields.get("id").is_none());
        assert!(fields.get("emoji").is_none());
        assert_eq!(fields["name"], json!("Groceries"));
        assert_eq!(fields["users"], json!(["u1"]));
        assert_eq!(fields["items"], json!([]));
    }

    #[test]
    fn test_fields_roundtrip_through_mapping() {
        let list = List {
            id: "l1".to_string(),
            name: "Trip".to_string(),
            items: vec![Item {
                id: "a".to_string(),
                text: "Passport".to_string(),
                done: false,
                order: 0,
            }],
            users: vec!["u1".to_string()],
            emoji: Some("✈️".to_string()),
            color: Some("gold".to_string()),
        };

        let mapped = map_list(&RawDocument::new("l1", list_fields(&list)));
        assert_eq!(mapped, list);
    }
}
