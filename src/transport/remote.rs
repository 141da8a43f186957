//! TCP Bridge
//!
//! Connects the in-process delivery runtime to remote peers. Frames are a
//! 4-byte little-endian length followed by a bincode-encoded [`WireFrame`].
//!
//! Outbound traffic keeps one connection task per remote address, each
//! draining its own queue, which preserves send order per directed edge.
//! A connection that cannot be established or breaks mid-stream takes its
//! queued frames with it; the delivery contract is unreliable, so nobody
//! retries.
//!
//! Inbound client connections stay open: the first frame names the target
//! node and carries the request, and the response travels back on the same
//! socket.

use super::{ClientRef, Network};
use crate::protocol::{Address, ClientRequest, ClientResponse, PeerMessage};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedSender};

/// Everything that travels over a bridge connection.
#[derive(Debug, Serialize, Deserialize)]
pub enum WireFrame {
    Peer {
        from: Address,
        to: Address,
        msg: PeerMessage,
    },
    ClientRequest {
        to: Address,
        msg: ClientRequest,
    },
    ClientResponse {
        msg: ClientResponse,
    },
}

/// The remote half of the delivery runtime.
pub struct TcpBridge {
    local_addr: SocketAddr,
    connections: DashMap<SocketAddr, UnboundedSender<WireFrame>>,
}

/// Bind `listen` and attach the bridge to `net`. Peer frames received on
/// the listener are injected into the local mailboxes; outbound peer
/// traffic for non-local addresses is forwarded over TCP.
pub async fn attach(net: Arc<Network>, listen: SocketAddr) -> anyhow::Result<Arc<TcpBridge>> {
    let listener = TcpListener::bind(listen).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!("delivery bridge listening on {}", local_addr);

    let bridge = Arc::new(TcpBridge {
        local_addr,
        connections: DashMap::new(),
    });
    net.attach_bridge(bridge.clone());

    let accept_net = net.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    tracing::debug!("accepted connection from {}", peer);
                    tokio::spawn(serve_connection(accept_net.clone(), stream));
                }
                Err(err) => {
                    tracing::warn!("accept failed: {}", err);
                    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                }
            }
        }
    });

    Ok(bridge)
}

impl TcpBridge {
    /// The address the listener actually bound, useful when the configured
    /// port was 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Queue a peer message for a remote address. Drops the message when
    /// the address is not a `host:port` name.
    pub fn forward_peer(&self, from: &Address, to: &Address, msg: PeerMessage) {
        let target: SocketAddr = match to.0.parse() {
            Ok(addr) => addr,
            Err(_) => {
                tracing::warn!("address {} is not routable; dropping message", to);
                return;
            }
        };

        let frame = WireFrame::Peer {
            from: from.clone(),
            to: to.clone(),
            msg,
        };

        let sender = self
            .connections
            .entry(target)
            .or_insert_with(|| spawn_connection(target))
            .clone();

        if sender.send(frame).is_err() {
            // The connection task died; a fresh one is created on the next
            // send for this address.
            self.connections.remove(&target);
            tracing::debug!("connection to {} is gone; frame dropped", target);
        }
    }
}

/// One writer task per remote address: connect once, then drain the queue.
fn spawn_connection(target: SocketAddr) -> UnboundedSender<WireFrame> {
    let (tx, mut rx) = mpsc::unbounded_channel::<WireFrame>();

    tokio::spawn(async move {
        let stream = match TcpStream::connect(target).await {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!("cannot connect to {}: {}", target, err);
                return;
            }
        };

        let (_, mut writer) = stream.into_split();
        while let Some(frame) = rx.recv().await {
            if let Err(err) = write_frame(&mut writer, &frame).await {
                tracing::warn!("connection to {} broke: {}", target, err);
                return;
            }
        }
    });

    tx
}

/// Handle one accepted connection: peer frames are injected into the local
/// runtime; a client frame opens a response path back on this socket.
async fn serve_connection(net: Arc<Network>, stream: TcpStream) {
    let (mut reader, writer) = stream.into_split();

    // Response frames for this connection's client, if it turns out to be
    // one. The writer task starts on the first client frame and ends when
    // the connection's ClientRefs are gone.
    let (response_tx, response_rx) = mpsc::unbounded_channel::<ClientResponse>();
    let mut writer = Some(writer);
    let mut responses = Some(response_rx);

    loop {
        let frame = match read_frame(&mut reader).await {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(err) => {
                tracing::debug!("connection closed: {}", err);
                break;
            }
        };

        match frame {
            WireFrame::Peer { from, to, msg } => {
                net.send_peer(&from, &to, msg);
            }
            WireFrame::ClientRequest { to, msg } => {
                if let (Some(mut write_half), Some(mut rx)) = (writer.take(), responses.take()) {
                    tokio::spawn(async move {
                        while let Some(msg) = rx.recv().await {
                            let frame = WireFrame::ClientResponse { msg };
                            if write_frame(&mut write_half, &frame).await.is_err() {
                                return;
                            }
                        }
                    });
                }
                let reply = ClientRef::from_sender(response_tx.clone());
                net.send_client(&to, reply, msg);
            }
            WireFrame::ClientResponse { .. } => {
                tracing::warn!("unexpected client response frame on server side; dropping");
            }
        }
    }
}

async fn write_frame(writer: &mut OwnedWriteHalf, frame: &WireFrame) -> std::io::Result<()> {
    let payload = bincode::serialize(frame)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
    writer.write_all(&(payload.len() as u32).to_le_bytes()).await?;
    writer.write_all(&payload).await?;
    writer.flush().await
}

async fn read_frame(reader: &mut OwnedReadHalf) -> std::io::Result<Option<WireFrame>> {
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes).await {
        Ok(_) => {}
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err),
    }

    let len = u32::from_le_bytes(len_bytes) as usize;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;

    bincode::deserialize(&payload)
        .map(Some)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
}
