//! Multi-key stable ordering.
//!
//! `orderBy: [A, B]` means "by A, ties broken by B". It is applied as one
//! stable pass per key, last key first, so each earlier key dominates.
//!
//! Items without the key keep their slot during that key's pass; only the
//! items that have the key are reordered among themselves. Values of
//! different kinds are ordered by kind rank (see [`TypedValue::sort_cmp`]),
//! which keeps every pass a total order.

use crate::schema::{Direction, Order, TypedValue, ValueMap};
use std::cmp::Ordering;

/// Return the permutation of `0..fields.len()` that orders `fields`.
pub fn permutation(fields: &[ValueMap], orders: &[Order]) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..fields.len()).collect();

    for order in orders.iter().rev() {
        let key = order.key.as_str();
        let slots: Vec<usize> = (0..perm.len())
            .filter(|&slot| fields[perm[slot]].contains_key(key))
            .collect();
        let mut keyed: Vec<usize> = slots.iter().map(|&slot| perm[slot]).collect();

        keyed.sort_by(|&a, &b| match (fields[a].get(key), fields[b].get(key)) {
            (Some(x), Some(y)) => directed(x, y, order.direction),
            _ => Ordering::Equal,
        });

        for (slot, item) in slots.into_iter().zip(keyed) {
            perm[slot] = item;
        }
    }
    perm
}

fn directed(a: &TypedValue, b: &TypedValue, direction: Direction) -> Ordering {
    match direction {
        Direction::Asc => a.sort_cmp(b),
        Direction::Desc => b.sort_cmp(a),
    }
}

/// Reorder `items` by the permutation computed from `fields`.
///
/// `items` and `fields` must be parallel.
pub fn apply<T>(items: Vec<T>, fields: &[ValueMap], orders: &[Order]) -> Vec<T> {
    if orders.is_empty() {
        return items;
    }
    let perm = permutation(fields, orders);
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    perm.into_iter().filter_map(|i| slots[i].take()).collect()
}
