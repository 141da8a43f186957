//! Protocol Vocabulary
//!
//! Shared data types and the two message sets of the system: the peer
//! protocol spoken between ring members, and the client protocol spoken
//! between a client and the node it picked as coordinator.
//!
//! Every peer message carries the sender's node id. Read/write traffic is
//! additionally correlated by a request id that is unique only within the
//! coordinator that minted it; replicas echo the id back unchanged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Node identifier: a non-negative integer assigned at launch, unique
/// across the ring. Node ids and data keys share one ordered domain, which
/// is what makes the clockwise responsibility walk well defined.
pub type NodeId = u64;

/// Data key. Same domain as [`NodeId`].
pub type Key = u64;

/// The full record set of a node, keyed by data key.
pub type Records = BTreeMap<Key, VersionedItem>;

/// Opaque peer address, resolvable by the delivery runtime.
///
/// Inside one process this is whatever name the node registered under; on
/// the TCP bridge it is a `host:port` string. The core never inspects it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored value together with its per-key version counter.
///
/// Versions are monotone per key and start at 1; a key that was never
/// written has no item at all. When replicas disagree, the highest version
/// wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionedItem {
    pub value: String,
    pub version: u64,
}

impl VersionedItem {
    pub fn new(value: impl Into<String>, version: u64) -> Self {
        Self {
            value: value.into(),
            version,
        }
    }
}

// --- Peer protocol ---

/// Messages exchanged between ring members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PeerMessage {
    /// Sent by a starting node to any ring member to learn the topology.
    JoinRequest { sender: NodeId },

    /// Reply to `JoinRequest`: the responder's full view of the ring,
    /// including itself.
    NodesList {
        sender: NodeId,
        nodes: BTreeMap<NodeId, Address>,
    },

    /// Sent by a joiner to its ring successor to ask for the records the
    /// joiner will become responsible for.
    DataRequest { sender: NodeId },

    /// Reply to `DataRequest`: the successor's record set.
    JoinData { sender: NodeId, records: Records },

    /// Broadcast by a joiner once it holds its data: "I am now a member".
    Join { sender: NodeId },

    /// Broadcast by a recovering node so peers refresh their (possibly
    /// stale) address for it. Does not change responsibility.
    ReJoin { sender: NodeId },

    /// Broadcast by a leaving node after it handed its records off.
    Leave { sender: NodeId },

    /// The leaver's record set, pushed to the nodes that become
    /// responsible for its keys.
    LeaveData { sender: NodeId, records: Records },

    /// Coordinator asks a replica for its copy of a key.
    ReadRequest {
        sender: NodeId,
        request_id: u64,
        key: Key,
    },

    /// Replica's vote: its stored item for the key, or nothing. An empty
    /// vote still counts toward the read quorum.
    ReadResponse {
        sender: NodeId,
        request_id: u64,
        key: Key,
        item: Option<VersionedItem>,
    },

    /// Coordinator pushes the freshly versioned record to an owner. Applied
    /// unconditionally; no reply.
    WriteRequest {
        sender: NodeId,
        request_id: u64,
        key: Key,
        item: VersionedItem,
    },
}

// --- Client protocol ---

/// Requests a client may send to any ring member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientRequest {
    Read { key: Key },
    Update { key: Key, value: String },
    Leave,
}

/// Responses sent back to the client by the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClientResponse {
    /// Result of a read: the winning value, or `None` if every replica in
    /// the quorum reported the key as absent.
    Read {
        node: NodeId,
        key: Key,
        value: Option<String>,
    },

    /// Result of an update: the record as written, carrying the version
    /// the coordinator assigned.
    Update {
        node: NodeId,
        key: Key,
        item: VersionedItem,
    },

    /// The node accepted the leave request and is shutting down.
    Leave { node: NodeId },

    /// The operation failed: not enough nodes, quorum timeout, or a
    /// storage failure on the coordinator.
    Error { node: NodeId, reason: String },
}

#[cfg(test)]
mod tests;
