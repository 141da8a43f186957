//! Client Helpers
//!
//! One-shot request/response calls against a running node, used by the
//! `client` subcommand of the launcher. Each call opens a fresh TCP
//! connection to the target node's bridge, sends a single request frame,
//! and waits for the response frame on the same connection.

use crate::protocol::{Address, ClientRequest, ClientResponse, Key};
use crate::transport::remote::WireFrame;
use anyhow::{anyhow, Context};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// How long a client waits for the coordinator before giving up. Longer
/// than the coordinator's own quorum timeout, so a quorum failure comes
/// back as the node's error message instead of a dropped connection.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn read(remote: SocketAddr, key: Key) -> anyhow::Result<ClientResponse> {
    call(remote, ClientRequest::Read { key }).await
}

pub async fn update(remote: SocketAddr, key: Key, value: String) -> anyhow::Result<ClientResponse> {
    call(remote, ClientRequest::Update { key, value }).await
}

pub async fn leave(remote: SocketAddr) -> anyhow::Result<ClientResponse> {
    call(remote, ClientRequest::Leave).await
}

/// Send one request to the node listening at `remote` and wait for its
/// response.
pub async fn call(remote: SocketAddr, msg: ClientRequest) -> anyhow::Result<ClientResponse> {
    let mut stream = TcpStream::connect(remote)
        .await
        .with_context(|| format!("cannot connect to the node at {}", remote))?;

    // Nodes are registered under their bridge's socket address.
    let frame = WireFrame::ClientRequest {
        to: Address::new(remote.to_string()),
        msg,
    };
    let payload = bincode::serialize(&frame).context("cannot encode the request")?;
    stream.write_all(&(payload.len() as u32).to_le_bytes()).await?;
    stream.write_all(&payload).await?;
    stream.flush().await?;

    let frame = tokio::time::timeout(RESPONSE_TIMEOUT, read_response(&mut stream))
        .await
        .map_err(|_| anyhow!("no response from {} within {:?}", remote, RESPONSE_TIMEOUT))??;

    match frame {
        WireFrame::ClientResponse { msg } => Ok(msg),
        other => Err(anyhow!("unexpected frame from the node: {:?}", other)),
    }
}

async fn read_response(stream: &mut TcpStream) -> anyhow::Result<WireFrame> {
    let mut len_bytes = [0u8; 4];
    stream.read_exact(&mut len_bytes).await.context("connection closed early")?;

    let len = u32::from_le_bytes(len_bytes) as usize;
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await.context("truncated response")?;

    bincode::deserialize(&payload).context("cannot decode the response")
}
