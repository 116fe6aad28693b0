use crate::error::{Result, RingError};
use crate::peer::{PeerClient, PeerRef};
use crate::ring::Key;
use crate::tracker::TrackerClient;

/// Stores and looks up daily specials by restaurant name.
///
/// Every call picks a random entry point from the tracker, asks it for the owner of
/// the restaurant's key and talks to that owner directly.
#[derive(Debug, Clone)]
pub struct Guide {
    tracker: TrackerClient,
    peers: PeerClient,
}

impl Guide {
    pub fn new(tracker: TrackerClient, peers: PeerClient) -> Self {
        Self { tracker, peers }
    }

    pub async fn put(&self, restaurant: &str, daily_special: &str) -> Result<()> {
        let owner = self.find_owner(restaurant).await?;
        tracing::debug!("PUT {} -> peer {}", restaurant, owner.id);
        self.peers.put(&owner, restaurant, daily_special).await
    }

    /// `None` when the owner has no entry for `restaurant`.
    pub async fn get(&self, restaurant: &str) -> Result<Option<String>> {
        let owner = self.find_owner(restaurant).await?;
        tracing::debug!("GET {} -> peer {}", restaurant, owner.id);
        self.peers.get(&owner, restaurant).await
    }

    /// The peer responsible for `restaurant`.
    pub async fn find_owner(&self, restaurant: &str) -> Result<PeerRef> {
        let entry = self
            .tracker
            .random_peer()
            .await?
            .ok_or(RingError::NoPeers)?;

        self.peers
            .find_successor(&entry, Key::new(restaurant).id())
            .await
    }
}
