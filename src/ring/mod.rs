//! Ring Topology
//!
//! Pure functions over the current set of node ids. Node ids and data keys
//! live in the same integer domain; "clockwise" means ascending id order
//! with a wrap from the largest id back to the smallest.
//!
//! All placement decisions in the system reduce to these three functions,
//! so every node computes the exact same ownership map independently from
//! its own view of the membership.

use crate::protocol::{Key, NodeId};
use std::collections::BTreeSet;
use std::ops::Bound;

/// The id of the next node on the ring after `me`: the smallest id
/// strictly greater than `me`, wrapping to the minimum when `me` is the
/// largest member.
///
/// `ids` must be non-empty.
pub fn successor(ids: &BTreeSet<NodeId>, me: NodeId) -> NodeId {
    debug_assert!(!ids.is_empty(), "ring must have at least one node");
    ids.range((Bound::Excluded(me), Bound::Unbounded))
        .next()
        .or_else(|| ids.iter().next())
        .copied()
        .expect("ring must have at least one node")
}

/// The nodes responsible for `key`: the first `n` distinct ids met while
/// walking clockwise from the key itself. Ids at or after the key come
/// first in ascending order, then the walk wraps to the smallest ids.
///
/// Returns `min(ids.len(), n)` ids.
pub fn owners_for_key(ids: &BTreeSet<NodeId>, key: Key, n: usize) -> BTreeSet<NodeId> {
    ids.range(key..)
        .chain(ids.range(..key))
        .take(n)
        .copied()
        .collect()
}

/// The `n` nodes that follow `me` on the ring, excluding `me` itself.
///
/// These are the nodes that inherit responsibility for `me`'s keys when it
/// leaves. When the ring has fewer than `n + 1` members the result is
/// correspondingly smaller.
pub fn successor_replicas(ids: &BTreeSet<NodeId>, me: NodeId, n: usize) -> BTreeSet<NodeId> {
    ids.range((Bound::Excluded(me), Bound::Unbounded))
        .chain(ids.range(..=me))
        .take(n)
        .filter(|&&id| id != me)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests;
