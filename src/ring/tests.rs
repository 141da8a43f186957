use super::*;

fn ring(ids: &[NodeId]) -> BTreeSet<NodeId> {
    ids.iter().copied().collect()
}

fn owners(ids: &[NodeId], key: Key, n: usize) -> Vec<NodeId> {
    owners_for_key(&ring(ids), key, n).into_iter().collect()
}

// ============================================================
// SUCCESSOR TESTS
// ============================================================

#[test]
fn test_successor_ascending() {
    let ids = ring(&[10, 20, 30]);

    assert_eq!(successor(&ids, 10), 20);
    assert_eq!(successor(&ids, 20), 30);
}

#[test]
fn test_successor_wraps_to_minimum() {
    let ids = ring(&[10, 20, 30]);

    assert_eq!(successor(&ids, 30), 10);
    // An id that is not itself a member still has a successor.
    assert_eq!(successor(&ids, 35), 10);
    assert_eq!(successor(&ids, 5), 10);
}

#[test]
fn test_successor_single_node_is_itself() {
    let ids = ring(&[10]);

    assert_eq!(successor(&ids, 10), 10);
}

// ============================================================
// OWNERSHIP TESTS
// ============================================================

#[test]
fn test_owners_walk_clockwise_from_key() {
    // ids >= key come first ascending, then the wrap.
    assert_eq!(owners(&[10, 20, 30, 40], 15, 2), vec![20, 30]);
    assert_eq!(owners(&[10, 20, 30, 40], 20, 2), vec![20, 30]);
    assert_eq!(owners(&[10, 20, 30, 40], 35, 3), vec![10, 20, 40]);
}

#[test]
fn test_owners_wrap_past_largest_id() {
    // No id is >= the key, so the walk starts at the smallest id.
    assert_eq!(owners(&[10, 20, 30, 40], 100, 3), vec![10, 20, 30]);
}

#[test]
fn test_owners_count_is_clamped_to_ring_size() {
    for key in [0u64, 7, 25, 99] {
        assert_eq!(owners_for_key(&ring(&[10, 20]), key, 3).len(), 2);
        assert_eq!(owners_for_key(&ring(&[10, 20, 30]), key, 3).len(), 3);
        assert_eq!(owners_for_key(&ring(&[10, 20, 30, 40]), key, 3).len(), 3);
    }
}

#[test]
fn test_every_node_owns_every_key_when_n_covers_ring() {
    let ids = ring(&[10, 20, 30]);

    for key in [0u64, 10, 15, 25, 30, 1000] {
        let owners = owners_for_key(&ids, key, 3);
        assert_eq!(owners, ids, "key {} should be owned by all nodes", key);
    }
}

#[test]
fn test_owner_membership_matches_clockwise_distance() {
    // A node owns a key iff fewer than n members sit strictly between the
    // key and the node going clockwise.
    let ids = ring(&[10, 20, 30, 40, 50]);
    let n = 2;

    for key in 0..60u64 {
        let owners = owners_for_key(&ids, key, n);
        for &me in &ids {
            let between = ids
                .iter()
                .filter(|&&other| other != me)
                .filter(|&&other| {
                    clockwise_distance(&ids, key, other) < clockwise_distance(&ids, key, me)
                })
                .count();
            assert_eq!(
                owners.contains(&me),
                between < n,
                "key {} node {}: {} nodes in between",
                key,
                me,
                between
            );
        }
    }
}

/// Position of `id` in the clockwise walk starting at `key`.
fn clockwise_distance(ids: &BTreeSet<NodeId>, key: Key, id: NodeId) -> usize {
    ids.range(key..)
        .chain(ids.range(..key))
        .position(|&other| other == id)
        .expect("id must be a ring member")
}

// ============================================================
// LEAVE HANDOFF TESTS
// ============================================================

#[test]
fn test_successor_replicas_follow_the_leaver() {
    let ids = ring(&[10, 20, 30, 40]);

    assert_eq!(
        successor_replicas(&ids, 20, 3),
        ring(&[30, 40, 10]),
        "the three nodes after 20, wrapping"
    );
    assert_eq!(successor_replicas(&ids, 40, 2), ring(&[10, 20]));
}

#[test]
fn test_successor_replicas_never_include_self() {
    let ids = ring(&[10, 20, 30]);

    for &me in &ids {
        let replicas = successor_replicas(&ids, me, 3);
        assert!(!replicas.contains(&me));
        assert_eq!(replicas.len(), 2, "only two other nodes exist");
    }
}

#[test]
fn test_successor_replicas_small_ring() {
    assert!(successor_replicas(&ring(&[10]), 10, 3).is_empty());
    assert_eq!(successor_replicas(&ring(&[10, 20]), 10, 3), ring(&[20]));
}
