//! HTTP stub for calling peers.
//!
//! Every method takes the [`PeerRef`] of the target. A `410 Gone` answer becomes
//! [`RingError::PeerGone`], other failures keep the status and message of the remote.

use super::protocol::*;
use super::types::PeerRef;
use crate::error::{Result, RingError};
use crate::ring::Identifier;
use crate::transport::{HttpTransport, remote_error};

use reqwest::{Response, StatusCode};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PeerClient {
    transport: HttpTransport,
}

impl PeerClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            transport: HttpTransport::new(timeout),
        }
    }

    pub async fn create(&self, peer: &PeerRef) -> Result<()> {
        let response = self.transport.post_empty(peer.addr, ENDPOINT_CREATE).await?;
        expect_success(peer, response).await?;
        Ok(())
    }

    pub async fn join(&self, peer: &PeerRef, landmark: &PeerRef) -> Result<()> {
        let payload = JoinRequest {
            landmark: *landmark,
        };
        let response = self.transport.post(peer.addr, ENDPOINT_JOIN, &payload).await?;
        expect_success(peer, response).await?;
        Ok(())
    }

    pub async fn find_successor(&self, peer: &PeerRef, id: Identifier) -> Result<PeerRef> {
        let payload = FindSuccessorRequest { id };
        let response = self
            .transport
            .post(peer.addr, ENDPOINT_FIND_SUCCESSOR, &payload)
            .await?;
        let reply: PeerMessage = expect_success(peer, response).await?.json().await?;
        Ok(reply.peer)
    }

    pub async fn id(&self, peer: &PeerRef) -> Result<Identifier> {
        let response = self.transport.get(peer.addr, ENDPOINT_ID).await?;
        let reply: IdResponse = expect_success(peer, response).await?.json().await?;
        Ok(reply.id)
    }

    pub async fn predecessor(&self, peer: &PeerRef) -> Result<Option<PeerRef>> {
        let response = self.transport.get(peer.addr, ENDPOINT_PREDECESSOR).await?;
        let reply: PredecessorMessage = expect_success(peer, response).await?.json().await?;
        Ok(reply.peer)
    }

    pub async fn successor(&self, peer: &PeerRef) -> Result<PeerRef> {
        let response = self.transport.get(peer.addr, ENDPOINT_SUCCESSOR).await?;
        let reply: PeerMessage = expect_success(peer, response).await?.json().await?;
        Ok(reply.peer)
    }

    pub async fn set_predecessor(&self, peer: &PeerRef, predecessor: Option<PeerRef>) -> Result<()> {
        let payload = PredecessorMessage { peer: predecessor };
        let response = self
            .transport
            .post(peer.addr, ENDPOINT_PREDECESSOR, &payload)
            .await?;
        expect_success(peer, response).await?;
        Ok(())
    }

    pub async fn set_successor(&self, peer: &PeerRef, successor: PeerRef) -> Result<()> {
        let payload = PeerMessage { peer: successor };
        let response = self
            .transport
            .post(peer.addr, ENDPOINT_SUCCESSOR, &payload)
            .await?;
        expect_success(peer, response).await?;
        Ok(())
    }

    pub async fn stabilize(&self, peer: &PeerRef) -> Result<()> {
        let response = self.transport.post_empty(peer.addr, ENDPOINT_STABILIZE).await?;
        expect_success(peer, response).await?;
        Ok(())
    }

    pub async fn notify(&self, peer: &PeerRef, candidate: PeerRef) -> Result<()> {
        let payload = PeerMessage { peer: candidate };
        let response = self.transport.post(peer.addr, ENDPOINT_NOTIFY, &payload).await?;
        expect_success(peer, response).await?;
        Ok(())
    }

    pub async fn put(&self, peer: &PeerRef, restaurant: &str, daily_special: &str) -> Result<()> {
        let payload = PutRequest {
            restaurant: restaurant.to_string(),
            daily_special: daily_special.to_string(),
        };
        let response = self.transport.post(peer.addr, ENDPOINT_PUT, &payload).await?;
        expect_success(peer, response).await?;
        Ok(())
    }

    pub async fn get(&self, peer: &PeerRef, restaurant: &str) -> Result<Option<String>> {
        let payload = GetRequest {
            restaurant: restaurant.to_string(),
        };
        let response = self.transport.post(peer.addr, ENDPOINT_GET, &payload).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let reply: GetResponse = expect_success(peer, response).await?.json().await?;
        Ok(reply.daily_special)
    }

    pub async fn describe(&self, peer: &PeerRef) -> Result<String> {
        let response = self.transport.get(peer.addr, ENDPOINT_DESCRIBE).await?;
        let reply: DescribeResponse = expect_success(peer, response).await?.json().await?;
        Ok(reply.description)
    }

    pub async fn die(&self, peer: &PeerRef) -> Result<()> {
        let response = self.transport.post_empty(peer.addr, ENDPOINT_DIE).await?;
        expect_success(peer, response).await?;
        Ok(())
    }

    /// Follows successor links from `start` until it comes back to `start`.
    ///
    /// Returns the visited peers in ring order, ending with `start`. Gives up after
    /// `limit` hops, which only happens while links have not converged.
    pub async fn walk(&self, start: &PeerRef, limit: usize) -> Result<Vec<PeerRef>> {
        let mut visited = Vec::new();
        let mut current = *start;

        loop {
            current = self.successor(&current).await?;
            visited.push(current);

            if current == *start {
                return Ok(visited);
            }
            if visited.len() >= limit {
                return Err(RingError::RingNotClosed {
                    start: start.id,
                    hops: limit,
                });
            }
        }
    }
}

async fn expect_success(peer: &PeerRef, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::GONE {
        return Err(RingError::PeerGone(peer.id));
    }
    Err(remote_error(response).await)
}
