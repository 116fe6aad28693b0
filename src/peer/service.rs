use super::client::PeerClient;
use super::handlers;
use super::stabilizer::Stabilizer;
use super::types::{PeerRef, RingLinks};
use crate::config::PeerConfig;
use crate::error::{Result, RingError};
use crate::ring::Identifier;

use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

/// A ring member.
///
/// Links are guarded by one mutex which is never held across a remote call; the
/// directory is a concurrent map of its own. Calls addressed to this peer itself
/// (self-loop links) are served locally instead of going through HTTP.
pub struct PeerNode {
    me: PeerRef,
    links: Mutex<RingLinks>,
    directory: DashMap<String, String>,
    client: PeerClient,
    /// Serializes stabilization rounds (timer and remote triggers).
    round: Mutex<()>,
    alive: AtomicBool,
    stabilizer: Mutex<Option<JoinHandle<()>>>,
}

impl PeerNode {
    /// Builds a peer with self-loop links and an empty directory, without serving it.
    pub fn new(me: PeerRef, config: &PeerConfig) -> Arc<Self> {
        Arc::new(Self {
            me,
            links: Mutex::new(RingLinks::self_loop(me)),
            directory: DashMap::new(),
            client: PeerClient::new(config.request_timeout),
            round: Mutex::new(()),
            alive: AtomicBool::new(true),
            stabilizer: Mutex::new(None),
        })
    }

    /// Binds `bind_addr`, serves the peer over HTTP and starts its stabilizer.
    ///
    /// The handle of the peer uses the bound address, so port 0 is fine. The listener
    /// outlives [`PeerNode::die`]: a dead peer keeps answering `410 Gone`.
    pub async fn spawn(
        id: Identifier,
        bind_addr: SocketAddr,
        config: PeerConfig,
    ) -> Result<Arc<Self>> {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        let me = PeerRef::new(id, listener.local_addr()?);
        let node = Self::new(me, &config);

        let app = handlers::router(node.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Peer {} server failed: {}", id, e);
            }
        });

        let stabilizer = Stabilizer::new(&node, config.stabilize_interval).start();
        *node.stabilizer.lock().await = Some(stabilizer);

        info!("Peer {} listening on {}", id, me.addr);
        Ok(node)
    }

    pub fn me(&self) -> PeerRef {
        self.me
    }

    pub fn id(&self) -> Identifier {
        self.me.id
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(RingError::PeerGone(self.me.id))
        }
    }

    // ============================================================
    // RING PROTOCOL
    // ============================================================

    /// Makes this peer a ring of its own. Only the very first peer should call it.
    pub async fn create(&self) -> Result<()> {
        self.ensure_alive()?;

        let mut links = self.links.lock().await;
        links.predecessor = None;
        links.successor = self.me;

        info!("Ring created by {}", self.me.id);
        Ok(())
    }

    /// Asks `landmark` for the successor of this peer and links to it.
    ///
    /// The rest of the ring only learns about this peer through later stabilization rounds.
    pub async fn join(&self, landmark: &PeerRef) -> Result<()> {
        self.ensure_alive()?;

        self.links.lock().await.predecessor = None;
        let successor = self.find_successor_at(landmark, self.me.id).await?;
        self.links.lock().await.successor = successor;

        info!(
            "Peer {} joined through {} with successor {}",
            self.me.id, landmark.id, successor.id
        );
        Ok(())
    }

    /// Returns the peer owning `id`, forwarding along successor links when needed.
    ///
    /// Routing is linear in the ring size and has no hop limit: on links that do not
    /// form a cycle yet it may keep forwarding until a transport timeout fires.
    pub async fn find_successor(&self, id: Identifier) -> Result<PeerRef> {
        self.ensure_alive()?;

        let successor = {
            let links = self.links.lock().await;
            if links.is_singleton(&self.me) {
                return Ok(self.me);
            }
            links.successor
        };

        if id.is_between_open_closed(self.me.id, successor.id) {
            return Ok(successor);
        }

        tracing::debug!("Peer {} forwards lookup of {} to {}", self.me.id, id, successor.id);
        self.client.find_successor(&successor, id).await
    }

    pub async fn predecessor(&self) -> Result<Option<PeerRef>> {
        self.ensure_alive()?;
        Ok(self.links.lock().await.predecessor)
    }

    pub async fn successor(&self) -> Result<PeerRef> {
        self.ensure_alive()?;
        Ok(self.links.lock().await.successor)
    }

    pub async fn set_predecessor(&self, peer: Option<PeerRef>) -> Result<()> {
        self.ensure_alive()?;
        self.links.lock().await.predecessor = peer;
        Ok(())
    }

    pub async fn set_successor(&self, peer: PeerRef) -> Result<()> {
        self.ensure_alive()?;
        self.links.lock().await.successor = peer;
        Ok(())
    }

    /// One stabilization round.
    ///
    /// Adopts the successor's predecessor when it sits strictly between this peer and
    /// the successor, then notifies the (possibly new) successor about this peer.
    pub async fn stabilize(&self) -> Result<()> {
        self.ensure_alive()?;
        let _round = self.round.lock().await;

        let successor = self.links.lock().await.successor;
        let candidate = self.predecessor_of(&successor).await?;

        if let Some(candidate) = candidate
            && candidate.id.is_between_open_open(self.me.id, successor.id)
        {
            let mut links = self.links.lock().await;
            // set_successor/join may have replaced it while we were asking
            if links.successor == successor {
                links.successor = candidate;
                info!(
                    "Peer {} successor {} -> {}",
                    self.me.id, successor.id, candidate.id
                );
            }
        }

        let successor = self.links.lock().await.successor;
        self.notify_at(&successor, self.me).await
    }

    /// `peer` thinks it might be our predecessor.
    pub async fn notify(&self, peer: PeerRef) -> Result<()> {
        self.ensure_alive()?;

        let mut links = self.links.lock().await;
        let adopt = match links.predecessor {
            None => true,
            Some(current) => peer.id.is_between_open_open(current.id, self.me.id),
        };

        if adopt && links.predecessor != Some(peer) {
            info!(
                "Peer {} predecessor {} -> {}",
                self.me.id,
                describe_id(links.predecessor.as_ref()),
                peer.id
            );
            links.predecessor = Some(peer);
        }

        Ok(())
    }

    async fn find_successor_at(&self, target: &PeerRef, id: Identifier) -> Result<PeerRef> {
        if *target == self.me {
            self.find_successor(id).await
        } else {
            self.client.find_successor(target, id).await
        }
    }

    async fn predecessor_of(&self, target: &PeerRef) -> Result<Option<PeerRef>> {
        if *target == self.me {
            Ok(self.links.lock().await.predecessor)
        } else {
            self.client.predecessor(target).await
        }
    }

    async fn notify_at(&self, target: &PeerRef, candidate: PeerRef) -> Result<()> {
        if *target == self.me {
            self.notify(candidate).await
        } else {
            self.client.notify(target, candidate).await
        }
    }

    // ============================================================
    // STORAGE
    // ============================================================

    /// Stores the entry here, whether or not this peer owns its key.
    pub fn put(&self, restaurant: String, daily_special: String) -> Result<()> {
        self.ensure_alive()?;
        tracing::debug!("Peer {} stores {}", self.me.id, restaurant);
        self.directory.insert(restaurant, daily_special);
        Ok(())
    }

    pub fn get(&self, restaurant: &str) -> Result<Option<String>> {
        self.ensure_alive()?;
        Ok(self
            .directory
            .get(restaurant)
            .map(|entry| entry.value().clone()))
    }

    pub fn directory_len(&self) -> usize {
        self.directory.len()
    }

    /// Local entries sorted by restaurant name.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .directory
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort();
        entries
    }

    // ============================================================
    // DIAGNOSTICS & LIFECYCLE
    // ============================================================

    pub async fn describe(&self) -> Result<String> {
        self.ensure_alive()?;

        let links = self.links.lock().await.clone();
        let values = self
            .entries()
            .into_iter()
            .map(|(restaurant, special)| format!("({};{})", restaurant, special))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!(
            "Peer [id={}, successor={}, predecessor={}, values=[{}]]",
            self.me.id,
            links.successor.id,
            describe_id(links.predecessor.as_ref()),
            values
        ))
    }

    /// Kills the peer: stops stabilizing, every later call fails with
    /// [`RingError::PeerGone`] (`410 Gone` over HTTP).
    ///
    /// Stored entries and links are not handed over to anyone.
    pub async fn die(&self) {
        if !self.alive.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Some(handle) = self.stabilizer.lock().await.take() {
            handle.abort();
        }

        info!("Peer with id {} has died", self.me.id);
    }
}

fn describe_id(peer: Option<&PeerRef>) -> String {
    match peer {
        Some(peer) => peer.id.to_string(),
        None => "none".to_string(),
    }
}
