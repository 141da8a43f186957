//! Node Actor
//!
//! One ring member: a single-threaded message loop over a private mailbox,
//! holding the membership view, the write-through record cache, and the
//! tables of in-flight coordinated requests.
//!
//! ## Lifecycle
//! A node starts in one of three modes. `bootstrap` founds a ring of one.
//! `join` asks an existing member for the topology, pulls its share of the
//! data from its ring successor, and announces itself. `recover` rebuilds
//! the membership view after a crash, keeps the surviving record file, and
//! refreshes the peers' stale address for it. Only a `Ready` node serves
//! client traffic and peer data traffic; everything that arrives earlier
//! is logged and dropped.
//!
//! ## Coordination
//! Any ready node coordinates for any client. Reads and updates both start
//! with a fan-out to the key's owners and wait for R votes; an update then
//! bumps the highest version seen and pushes the new record to the current
//! owners. A per-request timer turns a stuck quorum into a client error.
//!
//! Handlers run to completion one message at a time; storage calls are
//! synchronous, so the cache and the record file never disagree at a
//! message boundary.

pub mod requests;


use crate::config::QuorumConfig;
use crate::protocol::{
    Address, ClientRequest, ClientResponse, Key, NodeId, PeerMessage, Records, VersionedItem,
};
use crate::ring;
use crate::storage::{FileStorage, StorageError};
use crate::transport::{ClientRef, Inbound, Network};
use requests::{ReadRequestStatus, WriteRequestStatus};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// How a node enters the system.
#[derive(Debug, Clone)]
pub enum StartupMode {
    /// Found a new ring; this node starts alone and ready.
    Bootstrap,
    /// Enter an existing ring through the member at `remote`.
    Join { remote: Address },
    /// Come back after a crash through the member at `remote`, keeping the
    /// on-disk records.
    Recover { remote: Address },
}

/// Membership phase of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    JoiningWaitingNodes,
    JoiningWaitingData,
    RecoveringWaitingNodes,
    Ready,
}

/// Whether the message loop keeps running after a handler.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

pub struct NodeActor {
    id: NodeId,
    address: Address,
    state: State,
    mode: StartupMode,
    quorum: QuorumConfig,
    net: Arc<Network>,
    storage: FileStorage,

    /// Every member the node knows of, itself included.
    nodes: BTreeMap<NodeId, Address>,
    /// Write-through mirror of the record file.
    cache: HashMap<Key, VersionedItem>,

    read_requests: HashMap<u64, ReadRequestStatus>,
    write_requests: HashMap<u64, WriteRequestStatus>,
    request_timers: HashMap<u64, JoinHandle<()>>,
    /// Monotone id for requests this node coordinates. Unique only within
    /// this node.
    request_count: u64,

    self_tx: UnboundedSender<Inbound>,
    mailbox: UnboundedReceiver<Inbound>,
}

impl NodeActor {
    /// Node that founds a new ring.
    pub fn bootstrap(
        id: NodeId,
        storage_dir: impl AsRef<Path>,
        quorum: QuorumConfig,
        net: Arc<Network>,
        address: Address,
    ) -> anyhow::Result<Self> {
        Self::new(id, storage_dir, StartupMode::Bootstrap, quorum, net, address)
    }

    /// Node that joins an existing ring for the first time.
    pub fn join(
        id: NodeId,
        storage_dir: impl AsRef<Path>,
        remote: Address,
        quorum: QuorumConfig,
        net: Arc<Network>,
        address: Address,
    ) -> anyhow::Result<Self> {
        Self::new(id, storage_dir, StartupMode::Join { remote }, quorum, net, address)
    }

    /// Node that rejoins the ring after a crash.
    pub fn recover(
        id: NodeId,
        storage_dir: impl AsRef<Path>,
        remote: Address,
        quorum: QuorumConfig,
        net: Arc<Network>,
        address: Address,
    ) -> anyhow::Result<Self> {
        Self::new(id, storage_dir, StartupMode::Recover { remote }, quorum, net, address)
    }

    fn new(
        id: NodeId,
        storage_dir: impl AsRef<Path>,
        mode: StartupMode,
        quorum: QuorumConfig,
        net: Arc<Network>,
        address: Address,
    ) -> anyhow::Result<Self> {
        quorum.validate()?;
        let storage = FileStorage::open(storage_dir, id)?;
        let (self_tx, mailbox) = net.register(&address);

        let mut nodes = BTreeMap::new();
        nodes.insert(id, address.clone());

        tracing::info!("node [{}]: initialized in mode {:?}", id, mode);

        Ok(Self {
            id,
            address,
            state: State::Ready, // overwritten by pre_start
            mode,
            quorum,
            net,
            storage,
            nodes,
            cache: HashMap::new(),
            read_requests: HashMap::new(),
            write_requests: HashMap::new(),
            request_timers: HashMap::new(),
            request_count: 0,
            self_tx,
            mailbox,
        })
    }

    /// Drive the node until it leaves the ring or its mailbox closes.
    pub async fn run(mut self) {
        if let Err(err) = self.pre_start() {
            tracing::error!("node [{}]: startup failed: {}", self.id, err);
            self.net.deregister(&self.address);
            return;
        }

        while let Some(inbound) = self.mailbox.recv().await {
            if self.handle(inbound) == Flow::Stop {
                break;
            }
        }

        self.net.deregister(&self.address);
        tracing::info!("node [{}]: message loop terminated", self.id);
    }

    /// Startup actions of the chosen mode, before any message is served.
    fn pre_start(&mut self) -> Result<(), StorageError> {
        match self.mode.clone() {
            StartupMode::Bootstrap => {
                self.storage.clear()?;
                self.state = State::Ready;
                tracing::debug!("node [{}]: storage initialized, ready", self.id);
            }
            StartupMode::Join { remote } => {
                self.storage.clear()?;
                self.send_to_address(&remote, PeerMessage::JoinRequest { sender: self.id });
                self.state = State::JoiningWaitingNodes;
                tracing::debug!("node [{}]: asked [{}] to join, waiting for nodes", self.id, remote);
            }
            StartupMode::Recover { remote } => {
                // Keep the record file; its keys get filtered once the
                // current topology is known.
                self.send_to_address(&remote, PeerMessage::JoinRequest { sender: self.id });
                self.state = State::RecoveringWaitingNodes;
                tracing::debug!("node [{}]: asked [{}] for nodes, recovering", self.id, remote);
            }
        }
        Ok(())
    }

    // --- Dispatch ---

    fn handle(&mut self, inbound: Inbound) -> Flow {
        match inbound {
            Inbound::Peer { from, msg } => {
                self.handle_peer(from, msg);
                Flow::Continue
            }
            Inbound::Client { reply, msg } => self.handle_client(reply, msg),
            Inbound::Timeout { request_id } => {
                self.on_request_timeout(request_id);
                Flow::Continue
            }
        }
    }

    fn handle_peer(&mut self, from: Address, msg: PeerMessage) {
        match msg {
            PeerMessage::JoinRequest { sender } => self.on_join_request(from, sender),
            PeerMessage::NodesList { sender, nodes } => self.on_nodes_list(sender, nodes),
            PeerMessage::DataRequest { sender } => self.on_data_request(from, sender),
            PeerMessage::JoinData { sender, records } => self.on_join_data(sender, records),
            PeerMessage::Join { sender } => self.on_join(from, sender),
            PeerMessage::ReJoin { sender } => self.on_rejoin(from, sender),
            PeerMessage::Leave { sender } => self.on_leave(sender),
            PeerMessage::LeaveData { sender, records } => self.on_leave_data(sender, records),
            PeerMessage::ReadRequest {
                sender,
                request_id,
                key,
            } => self.on_read_request(from, sender, request_id, key),
            PeerMessage::ReadResponse {
                sender,
                request_id,
                item,
                ..
            } => self.on_read_response(sender, request_id, item),
            PeerMessage::WriteRequest {
                sender,
                request_id,
                key,
                item,
            } => self.on_write_request(sender, request_id, key, item),
        }
    }

    fn handle_client(&mut self, reply: ClientRef, msg: ClientRequest) -> Flow {
        if self.state != State::Ready {
            tracing::warn!(
                "node [{}]: client request {:?} while not ready ({:?}); dropping",
                self.id,
                msg,
                self.state
            );
            return Flow::Continue;
        }

        match msg {
            ClientRequest::Read { key } => {
                self.on_client_read(reply, key);
                Flow::Continue
            }
            ClientRequest::Update { key, value } => {
                self.on_client_update(reply, key, value);
                Flow::Continue
            }
            ClientRequest::Leave => self.on_client_leave(reply),
        }
    }

    // --- Membership engine ---

    fn on_join_request(&mut self, from: Address, sender: NodeId) {
        if self.state != State::Ready {
            tracing::warn!(
                "node [{}]: node [{}] asks to join but I am not ready ({:?}); ignoring",
                self.id,
                sender,
                self.state
            );
            return;
        }

        tracing::debug!(
            "node [{}]: node [{}] asks to join, sending my nodes: {:?}",
            self.id,
            sender,
            self.node_ids()
        );
        self.send_to_address(
            &from,
            PeerMessage::NodesList {
                sender: self.id,
                nodes: self.nodes.clone(),
            },
        );
    }

    fn on_nodes_list(&mut self, sender: NodeId, nodes: BTreeMap<NodeId, Address>) {
        match self.state {
            State::JoiningWaitingNodes => {
                tracing::debug!(
                    "node [{}]: node [{}] sent the nodes list: {:?}",
                    self.id,
                    sender,
                    nodes.keys().collect::<Vec<_>>()
                );
                self.nodes.extend(nodes);

                // Ask the ring successor for the records this node will be
                // responsible for.
                let next = ring::successor(&self.node_ids(), self.id);
                self.send_to_node(next, PeerMessage::DataRequest { sender: self.id });
                self.state = State::JoiningWaitingData;
            }

            State::RecoveringWaitingNodes => {
                debug_assert!(self.cache.is_empty());
                self.nodes.extend(nodes);

                // The topology may have moved on while this node was down;
                // drop the keys it no longer owns.
                if let Err(err) = self.purge_old_keys() {
                    tracing::error!("node [{}]: purge after recovery failed: {}", self.id, err);
                }

                // The list very likely contains a stale address for this
                // node; overwrite it and tell everyone the new one.
                self.nodes.insert(self.id, self.address.clone());
                self.multicast(PeerMessage::ReJoin { sender: self.id });

                self.state = State::Ready;
                tracing::info!(
                    "node [{}]: recovery completed, ring = {:?}",
                    self.id,
                    self.node_ids()
                );
            }

            _ => {
                tracing::warn!(
                    "node [{}]: unexpected nodes list from [{}] in state {:?}; ignoring",
                    self.id,
                    sender,
                    self.state
                );
            }
        }
    }

    fn on_data_request(&mut self, from: Address, sender: NodeId) {
        if self.state != State::Ready {
            tracing::warn!(
                "node [{}]: node [{}] asks for my data but I am not ready ({:?}); ignoring",
                self.id,
                sender,
                self.state
            );
            return;
        }

        match self.storage.read_all() {
            Ok(records) => {
                tracing::debug!(
                    "node [{}]: node [{}] asks for my data, sending {} keys",
                    self.id,
                    sender,
                    records.len()
                );
                self.send_to_address(
                    &from,
                    PeerMessage::JoinData {
                        sender: self.id,
                        records,
                    },
                );
            }
            Err(err) => {
                tracing::error!("node [{}]: cannot read records for a joiner: {}", self.id, err);
            }
        }
    }

    fn on_join_data(&mut self, sender: NodeId, records: Records) {
        if self.state != State::JoiningWaitingData {
            tracing::warn!(
                "node [{}]: unexpected join data from [{}] in state {:?}; ignoring",
                self.id,
                sender,
                self.state
            );
            return;
        }

        tracing::debug!(
            "node [{}]: node [{}] sent its records: {:?}",
            self.id,
            sender,
            records.keys().collect::<Vec<_>>()
        );
        match self.storage.append_all(&records) {
            Ok(()) => self.cache.extend(records),
            Err(err) => tracing::error!("node [{}]: storing join data failed: {}", self.id, err),
        }

        // Announce membership; from here on this node serves traffic.
        self.multicast(PeerMessage::Join { sender: self.id });
        self.state = State::Ready;
        tracing::info!(
            "node [{}]: joined the ring, nodes = {:?}",
            self.id,
            self.node_ids()
        );
    }

    fn on_join(&mut self, from: Address, sender: NodeId) {
        self.nodes.insert(sender, from);
        tracing::info!(
            "node [{}]: node [{}] is joining, ring = {:?}",
            self.id,
            sender,
            self.node_ids()
        );

        if let Err(err) = self.purge_old_keys() {
            tracing::error!("node [{}]: purge after join failed: {}", self.id, err);
        }
    }

    fn on_rejoin(&mut self, from: Address, sender: NodeId) {
        // A recovered node comes back under a fresh address; ownership is
        // unchanged, so no purge here.
        self.nodes.insert(sender, from);
        tracing::warn!(
            "node [{}]: node [{}] re-joined after a crash, ring = {:?}",
            self.id,
            sender,
            self.node_ids()
        );
    }

    fn on_leave(&mut self, sender: NodeId) {
        self.nodes.remove(&sender);
        tracing::info!(
            "node [{}]: node [{}] is leaving, ring = {:?}",
            self.id,
            sender,
            self.node_ids()
        );
    }

    fn on_leave_data(&mut self, sender: NodeId, records: Records) {
        if self.state != State::Ready {
            tracing::warn!(
                "node [{}]: leave data from [{}] while not ready ({:?}); ignoring",
                self.id,
                sender,
                self.state
            );
            return;
        }

        tracing::info!(
            "node [{}]: node [{}] handed over {} records before leaving",
            self.id,
            sender,
            records.len()
        );
        match self.storage.append_all(&records) {
            Ok(()) => self.cache.extend(records),
            Err(err) => tracing::error!("node [{}]: storing leave data failed: {}", self.id, err),
        }
    }

    fn on_client_leave(&mut self, reply: ClientRef) -> Flow {
        tracing::warn!("node [{}]: a client asks me to leave", self.id);

        let records = match self.storage.read_all() {
            Ok(records) => records,
            Err(err) => {
                tracing::error!("node [{}]: cannot read records for handoff: {}", self.id, err);
                reply.send(ClientResponse::Error {
                    node: self.id,
                    reason: format!("leave aborted, storage failure: {}", err),
                });
                return Flow::Continue;
            }
        };

        // Push this node's records to the members that will become
        // responsible for them once it is gone.
        let heirs = ring::successor_replicas(&self.node_ids(), self.id, self.quorum.replication);
        for heir in heirs {
            self.send_to_node(
                heir,
                PeerMessage::LeaveData {
                    sender: self.id,
                    records: records.clone(),
                },
            );
        }

        self.multicast(PeerMessage::Leave { sender: self.id });
        reply.send(ClientResponse::Leave { node: self.id });

        // The record file stays on disk; only the process goes away.
        tracing::info!("node [{}]: goodbye", self.id);
        Flow::Stop
    }

    // --- Quorum coordinator ---

    fn on_client_read(&mut self, reply: ClientRef, key: Key) {
        if self.quorum.read_quorum > self.nodes.len() || self.quorum.replication > self.nodes.len()
        {
            tracing::warn!(
                "node [{}]: read of key [{}] refused, not enough nodes (R={}, N={}, nodes={})",
                self.id,
                key,
                self.quorum.read_quorum,
                self.quorum.replication,
                self.nodes.len()
            );
            reply.send(ClientResponse::Error {
                node: self.id,
                reason: "read is not possible, not enough nodes in the ring".into(),
            });
            return;
        }

        self.request_count += 1;
        let request_id = self.request_count;
        self.read_requests.insert(
            request_id,
            ReadRequestStatus::new(key, reply, self.quorum.read_quorum),
        );
        self.schedule_timeout(request_id);

        let owners = ring::owners_for_key(&self.node_ids(), key, self.quorum.replication);
        tracing::info!(
            "node [{}]: read request [{}] for key [{}], asking nodes {:?}",
            self.id,
            request_id,
            key,
            owners
        );
        for owner in owners {
            self.send_to_node(
                owner,
                PeerMessage::ReadRequest {
                    sender: self.id,
                    request_id,
                    key,
                },
            );
        }
    }

    fn on_client_update(&mut self, reply: ClientRef, key: Key, value: String) {
        // Only the replication factor is checked here; a configuration
        // whose R exceeds the live ring stalls below until the timeout.
        if self.quorum.replication > self.nodes.len() {
            tracing::warn!(
                "node [{}]: update of key [{}] refused, not enough nodes (N={}, nodes={})",
                self.id,
                key,
                self.quorum.replication,
                self.nodes.len()
            );
            reply.send(ClientResponse::Error {
                node: self.id,
                reason: "update is not possible, not enough nodes in the ring".into(),
            });
            return;
        }

        self.request_count += 1;
        let request_id = self.request_count;
        self.write_requests.insert(
            request_id,
            WriteRequestStatus::new(
                key,
                value,
                reply,
                self.quorum.read_quorum,
                self.quorum.write_quorum,
            ),
        );
        self.schedule_timeout(request_id);

        // The update starts with the same fan-out as a read, to learn the
        // current version.
        let owners = ring::owners_for_key(&self.node_ids(), key, self.quorum.replication);
        tracing::info!(
            "node [{}]: update request [{}] for key [{}], asking nodes {:?}",
            self.id,
            request_id,
            key,
            owners
        );
        for owner in owners {
            self.send_to_node(
                owner,
                PeerMessage::ReadRequest {
                    sender: self.id,
                    request_id,
                    key,
                },
            );
        }
    }

    fn on_read_request(&mut self, from: Address, sender: NodeId, request_id: u64, key: Key) {
        if self.state != State::Ready {
            tracing::warn!(
                "node [{}]: read request from [{}] while not ready ({:?}); ignoring",
                self.id,
                sender,
                self.state
            );
            return;
        }

        let item = self.cache.get(&key).cloned();
        tracing::debug!(
            "node [{}]: read request [{}] from [{}] for key [{}]: {}",
            self.id,
            request_id,
            sender,
            key,
            item.as_ref()
                .map(|item| format!("\"{}\" v{}", item.value, item.version))
                .unwrap_or_else(|| "not found".into())
        );
        self.send_to_address(
            &from,
            PeerMessage::ReadResponse {
                sender: self.id,
                request_id,
                key,
                item,
            },
        );
    }

    fn on_write_request(&mut self, sender: NodeId, request_id: u64, key: Key, item: VersionedItem) {
        if self.state != State::Ready {
            tracing::warn!(
                "node [{}]: write request from [{}] while not ready ({:?}); ignoring",
                self.id,
                sender,
                self.state
            );
            return;
        }

        // Applied wherever it arrives: ownership may have moved between
        // the coordinator's read and write phases, and the write phase has
        // no reply to refuse with.
        tracing::info!(
            "node [{}]: write request [{}] from [{}]: key [{}] -> \"{}\" v{}",
            self.id,
            request_id,
            sender,
            key,
            item.value,
            item.version
        );
        if let Err(err) = self.write(key, item) {
            tracing::error!("node [{}]: replica write failed: {}", self.id, err);
        }
    }

    fn on_read_response(&mut self, sender: NodeId, request_id: u64, item: Option<VersionedItem>) {
        if let Some(mut status) = self.read_requests.remove(&request_id) {
            status.add_vote(item);
            if !status.quorum_reached() {
                tracing::debug!(
                    "node [{}]: read request [{}], vote from [{}], quorum not reached yet",
                    self.id,
                    request_id,
                    sender
                );
                self.read_requests.insert(request_id, status);
                return;
            }

            let latest = status.latest().cloned();
            tracing::info!(
                "node [{}]: read request [{}] reached its quorum, result {}",
                self.id,
                request_id,
                latest
                    .as_ref()
                    .map(|item| format!("\"{}\" v{}", item.value, item.version))
                    .unwrap_or_else(|| "not found".into())
            );
            status.client().send(ClientResponse::Read {
                node: self.id,
                key: status.key(),
                value: latest.map(|item| item.value),
            });
            self.cancel_timeout(request_id);
            return;
        }

        if let Some(mut status) = self.write_requests.remove(&request_id) {
            status.add_vote(item);
            if !status.quorum_reached() {
                tracing::debug!(
                    "node [{}]: update request [{}], vote from [{}], quorum not reached yet",
                    self.id,
                    request_id,
                    sender
                );
                self.write_requests.insert(request_id, status);
                return;
            }

            let updated = status.updated_record();
            tracing::info!(
                "node [{}]: update request [{}] reached its quorum, writing \"{}\" v{} (w={})",
                self.id,
                request_id,
                updated.value,
                updated.version,
                status.write_quorum()
            );
            status.client().send(ClientResponse::Update {
                node: self.id,
                key: status.key(),
                item: updated.clone(),
            });

            // Owners are recomputed here: the ring may have changed since
            // the read fan-out.
            let owners =
                ring::owners_for_key(&self.node_ids(), status.key(), self.quorum.replication);
            for owner in owners {
                // TODO: this should carry `request_id`, not the latest
                // counter value; a newer in-flight request can collide.
                self.send_to_node(
                    owner,
                    PeerMessage::WriteRequest {
                        sender: self.id,
                        request_id: self.request_count,
                        key: status.key(),
                        item: updated.clone(),
                    },
                );
            }
            self.cancel_timeout(request_id);
            return;
        }

        tracing::debug!(
            "node [{}]: stale vote for request [{}] from [{}]; ignoring",
            self.id,
            request_id,
            sender
        );
    }

    fn on_request_timeout(&mut self, request_id: u64) {
        let client = match (
            self.read_requests.remove(&request_id),
            self.write_requests.remove(&request_id),
        ) {
            (Some(status), _) => status.client().clone(),
            (None, Some(status)) => status.client().clone(),
            // The request completed before the timer fired.
            (None, None) => return,
        };

        tracing::warn!(
            "node [{}]: quorum timeout for request [{}], cancelling the operation",
            self.id,
            request_id
        );
        client.send(ClientResponse::Error {
            node: self.id,
            reason: "timeout for this operation has been reached".into(),
        });
        self.request_timers.remove(&request_id);
    }

    // --- Internals ---

    /// All known node ids, this node included.
    fn node_ids(&self) -> BTreeSet<NodeId> {
        self.nodes.keys().copied().collect()
    }

    /// Write-through: the record file first, the cache second.
    fn write(&mut self, key: Key, item: VersionedItem) -> Result<(), StorageError> {
        self.storage.append(key, &item)?;
        self.cache.insert(key, item);
        Ok(())
    }

    /// Drop every stored key this node no longer owns under the current
    /// ring. Rewrites the record file and resets the cache to match.
    fn purge_old_keys(&mut self) -> Result<(), StorageError> {
        let ids = self.node_ids();
        let old_records = self.storage.read_all()?;

        let retained: Records = old_records
            .into_iter()
            .filter(|(key, _)| {
                ring::owners_for_key(&ids, *key, self.quorum.replication).contains(&self.id)
            })
            .collect();

        tracing::debug!(
            "node [{}]: cleaning storage, ring = {:?}, retained keys = {:?}",
            self.id,
            ids,
            retained.keys().collect::<Vec<_>>()
        );

        self.storage.write_all(&retained)?;
        self.cache = retained.into_iter().collect();
        Ok(())
    }

    /// One-shot quorum timer; delivers a timeout message back to this
    /// node's own mailbox.
    fn schedule_timeout(&mut self, request_id: u64) {
        let tx = self.self_tx.clone();
        let timeout = self.quorum.timeout;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = tx.send(Inbound::Timeout { request_id });
        });
        self.request_timers.insert(request_id, timer);
    }

    fn cancel_timeout(&mut self, request_id: u64) {
        if let Some(timer) = self.request_timers.remove(&request_id) {
            timer.abort();
        }
    }

    /// Send to a peer by id, resolving the address at send time.
    fn send_to_node(&self, node: NodeId, msg: PeerMessage) {
        match self.nodes.get(&node) {
            Some(addr) => self.net.send_peer(&self.address, addr, msg),
            None => tracing::warn!(
                "node [{}]: no address for node [{}]; dropping {:?}",
                self.id,
                node,
                msg
            ),
        }
    }

    fn send_to_address(&self, to: &Address, msg: PeerMessage) {
        self.net.send_peer(&self.address, to, msg);
    }

    /// Send to every known member except this node.
    fn multicast(&self, msg: PeerMessage) {
        for (node, addr) in &self.nodes {
            if *node != self.id {
                self.net.send_peer(&self.address, addr, msg.clone());
            }
        }
    }
}
