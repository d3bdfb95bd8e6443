//! Live-query filters

use serde_json::Value;

/// A filter over one collection
///
/// The application only ever needs membership queries ("all lists whose
/// `users` array contains this user id"), so that is the only filter
/// shape supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub collection: String,
    pub filter: Filter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Matches documents where `field` is an array containing `value`
    ArrayContains { field: String, value: String },
}

impl Query {
    pub fn array_contains(
        collection: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            filter: Filter::ArrayContains {
                field: field.into(),
                value: value.into(),
            },
        }
    }

    /// Evaluate the filter against a document's fields
    pub fn matches(&self, fields: &Value) -> bool {
        match &self.filter {
            Filter::ArrayContains { field, value } => fields
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|arr| arr.iter().any(|v| v.as_str() == Some(value))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_contains_matches() {
        let query = Query::array_contains("lists", "users", "user-1");

        assert!(query.matches(&json!({"users": ["user-1", "user-2"]})));
        assert!(!query.matches(&json!({"users": ["user-2"]})));
    }

    #[test]
    fn test_array_contains_tolerates_shape_mismatch() {
        let query = Query::array_contains("lists", "users", "user-1");

        assert!(!query.matches(&json!({})));
        assert!(!query.matches(&json!({"users": "user-1"})));
        assert!(!query.matches(&json!({"users": [42]})));
    }
}
