//! Delivery Runtime
//!
//! The process-level messaging layer the node actors sit on. Each node
//! registers a mailbox under an opaque [`Address`]; sending resolves the
//! target address to a local mailbox, or hands the message to the TCP
//! bridge when one is attached and the address names a remote peer.
//!
//! Delivery is best effort: an unknown or unreachable target means the
//! message is logged and dropped, never an error to the sender. Per pair
//! of nodes, messages arrive in send order: locally by the mpsc channel,
//! remotely by the single connection per directed edge.
//!
//! For tests the runtime can isolate an address: everything to or from an
//! isolated node is silently discarded, which is how replica crashes and
//! network partitions are simulated.

pub mod remote;


use crate::protocol::{Address, ClientRequest, ClientResponse, PeerMessage};
use dashmap::{DashMap, DashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A message landing in a node's mailbox. Only ever constructed by the
/// runtime (peer and client traffic) and by the node's own timers.
#[derive(Debug)]
pub enum Inbound {
    /// A peer protocol message, with the sender's address for replies.
    Peer { from: Address, msg: PeerMessage },

    /// A client request together with the handle to answer on.
    Client { reply: ClientRef, msg: ClientRequest },

    /// A quorum timer fired for one of this node's own requests.
    Timeout { request_id: u64 },
}

/// Clonable handle used to deliver a response to a client.
///
/// Wraps a delivery closure so the same node code serves channel-backed
/// clients in tests and socket-backed clients on the TCP bridge.
#[derive(Clone)]
pub struct ClientRef {
    deliver: Arc<dyn Fn(ClientResponse) + Send + Sync>,
}

impl ClientRef {
    pub fn new(deliver: impl Fn(ClientResponse) + Send + Sync + 'static) -> Self {
        Self {
            deliver: Arc::new(deliver),
        }
    }

    /// A client that collects responses on an unbounded channel.
    pub fn from_sender(tx: UnboundedSender<ClientResponse>) -> Self {
        Self::new(move |response| {
            // The client may have stopped listening; that is its business.
            let _ = tx.send(response);
        })
    }

    pub fn send(&self, response: ClientResponse) {
        (self.deliver)(response);
    }
}

impl fmt::Debug for ClientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientRef")
    }
}

/// The process-wide mailbox registry.
pub struct Network {
    mailboxes: DashMap<Address, UnboundedSender<Inbound>>,
    isolated: DashSet<Address>,
    bridge: OnceLock<Arc<remote::TcpBridge>>,
}

impl Network {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            mailboxes: DashMap::new(),
            isolated: DashSet::new(),
            bridge: OnceLock::new(),
        })
    }

    /// Create a mailbox for `addr`. Returns the sender half too, so the
    /// owning node can post timer messages to itself. Re-registering an
    /// address replaces the previous mailbox (a restarted node takes its
    /// old name back).
    pub fn register(&self, addr: &Address) -> (UnboundedSender<Inbound>, UnboundedReceiver<Inbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.mailboxes.insert(addr.clone(), tx.clone());
        (tx, rx)
    }

    pub fn deregister(&self, addr: &Address) {
        self.mailboxes.remove(addr);
    }

    /// Deliver a peer message from `from` to `to`. Never blocks, never
    /// fails: undeliverable traffic is logged and dropped.
    pub fn send_peer(&self, from: &Address, to: &Address, msg: PeerMessage) {
        if self.is_cut(from) || self.is_cut(to) {
            tracing::debug!("dropping message {} -> {} (isolated)", from, to);
            return;
        }

        if let Some(mailbox) = self.mailboxes.get(to) {
            let _ = mailbox.send(Inbound::Peer {
                from: from.clone(),
                msg,
            });
            return;
        }

        if let Some(bridge) = self.bridge.get() {
            bridge.forward_peer(from, to, msg);
            return;
        }

        tracing::warn!("no route to {}; dropping message from {}", to, from);
    }

    /// Hand a client request to the node registered at `to`.
    pub fn send_client(&self, to: &Address, reply: ClientRef, msg: ClientRequest) {
        if self.is_cut(to) {
            tracing::debug!("dropping client request for {} (isolated)", to);
            return;
        }

        match self.mailboxes.get(to) {
            Some(mailbox) => {
                let _ = mailbox.send(Inbound::Client { reply, msg });
            }
            None => tracing::warn!("no node registered at {}; dropping client request", to),
        }
    }

    /// Cut a node off: all traffic to or from `addr` is discarded until
    /// [`Network::heal`] is called. Test instrumentation.
    pub fn isolate(&self, addr: &Address) {
        self.isolated.insert(addr.clone());
    }

    pub fn heal(&self, addr: &Address) {
        self.isolated.remove(addr);
    }

    fn is_cut(&self, addr: &Address) -> bool {
        self.isolated.contains(addr)
    }

    fn attach_bridge(&self, bridge: Arc<remote::TcpBridge>) {
        if self.bridge.set(bridge).is_err() {
            tracing::warn!("a TCP bridge is already attached; ignoring the new one");
        }
    }
}
