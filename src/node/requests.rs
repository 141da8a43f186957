//! In-flight request bookkeeping for the coordinator role.
//!
//! Each client read or update gets a status record keyed by the node's
//! monotone request counter. Replica votes accumulate until the read
//! quorum is reached; the record also keeps the client handle so the final
//! answer (or the timeout error) knows where to go.

use crate::protocol::{Key, VersionedItem};
use crate::transport::ClientRef;

/// Progress of a client read.
#[derive(Debug)]
pub struct ReadRequestStatus {
    key: Key,
    client: ClientRef,
    read_quorum: usize,
    votes: Vec<Option<VersionedItem>>,
}

impl ReadRequestStatus {
    pub fn new(key: Key, client: ClientRef, read_quorum: usize) -> Self {
        Self {
            key,
            client,
            read_quorum,
            votes: Vec::new(),
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn client(&self) -> &ClientRef {
        &self.client
    }

    /// Record one replica's vote. An absent item is still a vote.
    pub fn add_vote(&mut self, vote: Option<VersionedItem>) {
        self.votes.push(vote);
    }

    pub fn quorum_reached(&self) -> bool {
        self.votes.len() >= self.read_quorum
    }

    /// The winning vote: highest version seen so far. Among equal versions
    /// the earliest-collected vote wins, which keeps the choice
    /// deterministic for a given delivery order. `None` when every vote
    /// was empty.
    pub fn latest(&self) -> Option<&VersionedItem> {
        self.votes.iter().flatten().fold(None, |best, vote| match best {
            Some(current) if current.version >= vote.version => Some(current),
            _ => Some(vote),
        })
    }
}

/// Progress of a client update: the read phase that establishes the
/// current version, plus everything needed for the write fan-out.
#[derive(Debug)]
pub struct WriteRequestStatus {
    key: Key,
    value: String,
    client: ClientRef,
    read_quorum: usize,
    write_quorum: usize,
    votes: Vec<Option<VersionedItem>>,
}

impl WriteRequestStatus {
    pub fn new(
        key: Key,
        value: String,
        client: ClientRef,
        read_quorum: usize,
        write_quorum: usize,
    ) -> Self {
        Self {
            key,
            value,
            client,
            read_quorum,
            write_quorum,
            votes: Vec::new(),
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn client(&self) -> &ClientRef {
        &self.client
    }

    pub fn write_quorum(&self) -> usize {
        self.write_quorum
    }

    pub fn add_vote(&mut self, vote: Option<VersionedItem>) {
        self.votes.push(vote);
    }

    /// The update decision is gated on the read quorum; the write phase is
    /// fire-and-forget.
    pub fn quorum_reached(&self) -> bool {
        self.votes.len() >= self.read_quorum
    }

    /// The record to install once the quorum is in: the proposed value at
    /// one more than the highest version any replica reported (1 for a
    /// fresh key).
    pub fn updated_record(&self) -> VersionedItem {
        let current = self
            .votes
            .iter()
            .flatten()
            .map(|item| item.version)
            .max()
            .unwrap_or(0);

        VersionedItem::new(self.value.clone(), current + 1)
    }
}
