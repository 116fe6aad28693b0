use super::protocol::*;
use crate::error::{Result, RingError};
use crate::peer::PeerRef;
use crate::transport::{HttpTransport, remote_error};

use reqwest::StatusCode;
use std::net::SocketAddr;
use std::time::Duration;

/// HTTP stub for a tracker at a known address.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    addr: SocketAddr,
    transport: HttpTransport,
}

impl TrackerClient {
    pub fn new(addr: SocketAddr, timeout: Duration) -> Self {
        Self {
            addr,
            transport: HttpTransport::new(timeout),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn register(&self, peer: PeerRef) -> Result<()> {
        let payload = RegisterRequest { peer };
        let response = self
            .transport
            .post(self.addr, ENDPOINT_REGISTER, &payload)
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(RingError::AlreadyRegistered(peer.id)),
            _ => Err(remote_error(response).await),
        }
    }

    pub async fn random_peer(&self) -> Result<Option<PeerRef>> {
        let response = self.transport.get(self.addr, ENDPOINT_RANDOM_PEER).await?;
        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }

        let reply: RandomPeerResponse = response.json().await?;
        Ok(reply.peer)
    }

    pub async fn peers(&self) -> Result<Vec<PeerRef>> {
        let response = self.transport.get(self.addr, ENDPOINT_PEERS).await?;
        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }

        let reply: PeersResponse = response.json().await?;
        Ok(reply.peers)
    }
}
