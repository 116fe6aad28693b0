use super::handlers;
use crate::error::{Result, RingError};
use crate::peer::PeerRef;

use rand::Rng;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{Mutex, oneshot};
use tracing::info;

/// Registry of the peers that joined the ring.
///
/// One lock guards the list for both registration and lookups.
pub struct Tracker {
    peers: Mutex<Vec<PeerRef>>,
}

impl Tracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fails with [`RingError::AlreadyRegistered`] if a peer with the same id is listed.
    pub async fn register(&self, peer: PeerRef) -> Result<()> {
        let mut peers = self.peers.lock().await;

        if peers.contains(&peer) {
            return Err(RingError::AlreadyRegistered(peer.id));
        }

        peers.push(peer);
        info!("Registered peer {} ({} known)", peer, peers.len());
        Ok(())
    }

    pub async fn random_peer(&self) -> Option<PeerRef> {
        let peers = self.peers.lock().await;

        if peers.is_empty() {
            return None;
        }

        let idx = rand::thread_rng().gen_range(0..peers.len());
        Some(peers[idx])
    }

    pub async fn peers(&self) -> Vec<PeerRef> {
        self.peers.lock().await.clone()
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self {
            peers: Mutex::new(Vec::new()),
        }
    }
}

/// A tracker served over HTTP.
pub struct TrackerServer {
    pub tracker: Arc<Tracker>,
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TrackerServer {
    pub async fn spawn(bind_addr: SocketAddr) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        let addr = listener.local_addr()?;
        let tracker = Tracker::new();

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = handlers::router(tracker.clone());
        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("Tracker server failed: {}", e);
            }
        });

        info!("Tracker listening on {}", addr);

        Ok(Self {
            tracker,
            addr,
            shutdown: Some(shutdown_tx),
        })
    }

    pub fn shutdown(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
            info!("Tracker on {} shutting down", self.addr);
        }
    }
}

impl Drop for TrackerServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
