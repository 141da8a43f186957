//! Ring Store Library
//!
//! A peer-to-peer key-value store. Nodes form a logical ring ordered by
//! integer node id; every key is replicated on the N nodes found by walking
//! the ring clockwise from the key. Any ring member coordinates client
//! reads and updates by collecting a quorum of R versioned replies from the
//! replicas, bumping the version on update, and fanning the new record out
//! to the current owners.
//!
//! ## Architecture Modules
//! The system is composed of six loosely coupled subsystems:
//!
//! - **`protocol`**: The shared vocabulary: node ids, versioned items, the
//!   peer message set, and the client request/response set.
//! - **`ring`**: Pure topology functions: successor, owners of a key, the
//!   replicas that follow a node on the ring.
//! - **`storage`**: The durable record file behind each node, with
//!   append/rewrite semantics that tolerate duplicate records.
//! - **`transport`**: The process-level delivery runtime: per-node
//!   mailboxes, client response handles, and an optional TCP bridge for
//!   remote peers.
//! - **`node`**: The node actor itself: membership state machine, quorum
//!   coordination, replica handlers, and the single-threaded message loop.
//! - **`config`** / **`client`**: Launch configuration and the one-shot
//!   client helpers used by the command line interface.

pub mod client;
pub mod config;
pub mod node;
pub mod protocol;
pub mod ring;
pub mod storage;
pub mod transport;
