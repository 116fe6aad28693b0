//! Recurring stabilization of a peer's links.
//!
//! Joins only set the successor of the newcomer; everybody else learns about it here.
//! A failed round (dead successor, timeout) is logged and the next tick tries again.

use super::service::PeerNode;

use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct Stabilizer {
    /// Weak so the task never keeps a dropped peer around.
    node: Weak<PeerNode>,
    period: Duration,
}

impl Stabilizer {
    pub fn new(node: &Arc<PeerNode>, period: Duration) -> Self {
        Self {
            node: Arc::downgrade(node),
            period,
        }
    }

    /// Spawns the loop. The first round runs right away; on self-loop links it is a no-op.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(self) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let Some(node) = self.node.upgrade() else {
                break;
            };
            if !node.is_alive() {
                break;
            }

            match node.stabilize().await {
                Ok(()) => tracing::trace!("Peer {} stabilized", node.id()),
                Err(e) => tracing::warn!("Peer {} stabilization round failed: {}", node.id(), e),
            }
        }

        tracing::debug!("Stabilizer stopped");
    }
}
