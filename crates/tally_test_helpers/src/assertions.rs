//! Domain-specific assertions for Tally tests

use predicates::prelude::*;
use tally_common::Item;

/// Panic unless the items are sorted ascending by `order`
pub fn assert_sorted_by_order(items: &[Item]) {
    let orders: Vec<i64> = items.iter().map(|i| i.order).collect();
    let mut sorted = orders.clone();
    sorted.sort();
    assert_eq!(orders, sorted, "items are not sorted by order: {:?}", orders);
}

/// Panic unless every done item trails every not-done item
pub fn assert_done_trailing(items: &[Item]) {
    let first_done = items.iter().position(|i| i.done);
    if let Some(first_done) = first_done {
        assert!(
            items[first_done..].iter().all(|i| i.done),
            "done items are interleaved with not-done items"
        );
    }
}

/// Assert that stderr does NOT contain any of the given strings
pub fn stderr_not_contains(values: &[&str]) -> impl Predicate<str> {
    let owned_values: Vec<String> = values.iter().map(|&s| s.to_string()).collect();
    predicate::function(move |s: &str| !owned_values.iter().any(|v| s.contains(v.as_str())))
}
