//! Item ordering and completion policy
//!
//! Items are kept sorted ascending by `order`. Completing an item moves it
//! to the logical end of the whole list; un-completing moves it to the end
//! of the not-done group, before the first done item. Orders are sort keys
//! only: gaps are permitted and never renumbered.

use tally_common::Item;

/// Stable sort ascending by `order`; ties keep their current order
pub fn sort_by_order(items: &mut [Item]) {
    items.sort_by_key(|i| i.order);
}

/// Order for a newly appended item, by convention the current item count
pub fn next_order(items: &[Item]) -> i64 {
    items.len() as i64
}

/// Mark an item done and move it past every other item.
///
/// Returns the item's new order, or `None` if the id is unknown.
pub fn complete(items: &mut [Item], item_id: &str) -> Option<i64> {
    let max_order = items.iter().map(|i| i.order).max().unwrap_or(0);
    let item = items.iter_mut().find(|i| i.id == item_id)?;
    item.done = true;
    item.order = max_order + 1;
    let new_order = item.order;
    sort_by_order(items);
    Some(new_order)
}

/// Mark an item not-done and move it to the end of the not-done group.
///
/// With no other not-done items the item goes to the front (order 0).
/// Returns the item's new order, or `None` if the id is unknown.
pub fn uncomplete(items: &mut [Item], item_id: &str) -> Option<i64> {
    // Confirm the id exists before computing against "the others"
    items.iter().position(|i| i.id == item_id)?;

    let max_not_done = items
        .iter()
        .filter(|i| i.id != item_id && !i.done)
        .map(|i| i.order)
        .max();

    let item = items.iter_mut().find(|i| i.id == item_id)?;
    item.done = false;
    item.order = match max_not_done {
        Some(max) => max + 1,
        None => 0,
    };
    let new_order = item.order;
    sort_by_order(items);
    Some(new_order)
}
