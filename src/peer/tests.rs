//! Peer Module Tests
//!
//! ## Test Scopes
//! - **Handles**: identity, ordering and hashing of `PeerRef` by identifier only.
//! - **Local protocol**: self-loop construction, `create`, `notify` acceptance rules, routing
//!   decisions that need no network hop, storage and `describe`.
//! - **Networked ring**: joins, convergence under stabilization (manual and timer driven),
//!   routing correctness once converged, remote storage and peer death.
//!
//! Networked tests bind real listeners on `127.0.0.1:0`. Most of them push the timer back
//! to a one hour period after its round at spawn, and drive `stabilize()` by hand.

#[cfg(test)]
mod tests {
    use crate::config::PeerConfig;
    use crate::error::RingError;
    use crate::peer::stabilizer::Stabilizer;
    use crate::peer::{PeerClient, PeerNode, PeerRef};
    use crate::ring::{Identifier, Key};
    use reqwest::StatusCode;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    fn id(value: u64) -> Identifier {
        Identifier::new(value).unwrap()
    }

    /// A handle nobody listens on; fine for operations that never leave the peer.
    fn offline_ref(value: u64) -> PeerRef {
        PeerRef::new(id(value), "127.0.0.1:9".parse().unwrap())
    }

    fn manual_config() -> PeerConfig {
        PeerConfig::default()
            .with_stabilize_interval(Duration::from_secs(3600))
            .with_request_timeout(Duration::from_secs(5))
    }

    fn client() -> PeerClient {
        PeerClient::new(Duration::from_secs(5))
    }

    async fn spawn_peer(value: u64, config: PeerConfig) -> Arc<PeerNode> {
        PeerNode::spawn(id(value), "127.0.0.1:0".parse().unwrap(), config)
            .await
            .expect("Failed to spawn peer")
    }

    /// Creates the ring on the first id and joins the others through it, in order.
    async fn build_ring(ids: &[u64], config: PeerConfig) -> Vec<Arc<PeerNode>> {
        let mut nodes: Vec<Arc<PeerNode>> = Vec::new();
        for (i, value) in ids.iter().enumerate() {
            let node = spawn_peer(*value, config.clone()).await;
            if i == 0 {
                node.create().await.unwrap();
            } else {
                node.join(&nodes[0].me()).await.unwrap();
            }
            nodes.push(node);
        }
        nodes
    }

    /// Successor ids met when walking from `start`, or `None` if the walk fails.
    async fn walk_ids(start: &PeerRef, limit: usize) -> Option<Vec<u32>> {
        client()
            .walk(start, limit)
            .await
            .ok()
            .map(|visited| visited.iter().map(|p| p.id.value()).collect())
    }

    /// The ids a converged ring walk from `start` must produce.
    fn expected_walk(sorted_ids: &[u32], start: u32) -> Vec<u32> {
        let pos = sorted_ids.iter().position(|v| *v == start).unwrap();
        (1..=sorted_ids.len())
            .map(|step| sorted_ids[(pos + step) % sorted_ids.len()])
            .collect()
    }

    async fn is_converged(nodes: &[Arc<PeerNode>]) -> bool {
        let mut sorted: Vec<u32> = nodes.iter().map(|n| n.id().value()).collect();
        sorted.sort();

        for node in nodes {
            let walk = walk_ids(&node.me(), nodes.len() * 2).await;
            if walk != Some(expected_walk(&sorted, node.id().value())) {
                return false;
            }
        }
        true
    }

    async fn stabilize_until_converged(nodes: &[Arc<PeerNode>], max_rounds: usize) -> usize {
        for round in 1..=max_rounds {
            for node in nodes {
                node.stabilize().await.unwrap();
            }
            if is_converged(nodes).await {
                return round;
            }
        }
        panic!("ring did not converge after {} rounds", max_rounds);
    }

    /// Smallest id >= key, wrapping to the smallest id overall.
    fn expected_owner(sorted_ids: &[u32], key: u32) -> u32 {
        sorted_ids
            .iter()
            .copied()
            .find(|v| *v >= key)
            .unwrap_or(sorted_ids[0])
    }

    // ============================================================
    // PEER HANDLE TESTS
    // ============================================================

    #[test]
    fn test_peer_ref_equality_uses_id_only() {
        let a = PeerRef::new(id(100), "127.0.0.1:5000".parse().unwrap());
        let b = PeerRef::new(id(100), "10.0.0.1:6000".parse().unwrap());
        let c = PeerRef::new(id(200), "127.0.0.1:5000".parse().unwrap());

        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        set.insert(c);
        assert_eq!(set.len(), 2, "HashSet should dedupe handles by id");
    }

    #[test]
    fn test_peer_ref_ordering() {
        let mut peers = vec![offline_ref(900), offline_ref(0), offline_ref(400)];
        peers.sort();

        let ids: Vec<u32> = peers.iter().map(|p| p.id.value()).collect();
        assert_eq!(ids, vec![0, 400, 900]);
    }

    #[test]
    fn test_peer_ref_serialization() {
        let peer = offline_ref(700);
        let json = serde_json::to_string(&peer).unwrap();
        let restored: PeerRef = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.id, peer.id);
        assert_eq!(restored.addr, peer.addr);
    }

    // ============================================================
    // LOCAL PROTOCOL TESTS
    // ============================================================

    #[tokio::test]
    async fn test_new_peer_has_self_loop() {
        let me = offline_ref(300);
        let node = PeerNode::new(me, &manual_config());

        assert_eq!(node.successor().await.unwrap(), me);
        assert_eq!(node.predecessor().await.unwrap(), Some(me));
        assert_eq!(node.directory_len(), 0);
    }

    #[tokio::test]
    async fn test_create_makes_singleton_ring() {
        let me = offline_ref(0);
        let node = PeerNode::new(me, &manual_config());

        node.create().await.unwrap();

        assert_eq!(node.successor().await.unwrap(), me);
        assert_eq!(node.predecessor().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_singleton_owns_every_identifier() {
        let me = offline_ref(500);
        let node = PeerNode::new(me, &manual_config());
        node.create().await.unwrap();

        for value in [0, 499, 500, 501, 2_000_000_000] {
            assert_eq!(node.find_successor(id(value)).await.unwrap(), me);
        }
    }

    #[tokio::test]
    async fn test_find_successor_answers_for_own_arc() {
        let node = PeerNode::new(offline_ref(100), &manual_config());
        let successor = offline_ref(300);
        node.set_successor(successor).await.unwrap();

        // (100, 300] is answered without any network hop
        assert_eq!(node.find_successor(id(101)).await.unwrap(), successor);
        assert_eq!(node.find_successor(id(300)).await.unwrap(), successor);
    }

    #[tokio::test]
    async fn test_find_successor_arc_wraps_through_zero() {
        let node = PeerNode::new(offline_ref(900), &manual_config());
        let successor = offline_ref(0);
        node.set_successor(successor).await.unwrap();

        assert_eq!(node.find_successor(id(950)).await.unwrap(), successor);
        assert_eq!(node.find_successor(id(0)).await.unwrap(), successor);
    }

    #[tokio::test]
    async fn test_notify_adopts_when_predecessor_unknown() {
        let node = PeerNode::new(offline_ref(500), &manual_config());
        node.set_predecessor(None).await.unwrap();

        node.notify(offline_ref(800)).await.unwrap();
        assert_eq!(node.predecessor().await.unwrap(), Some(offline_ref(800)));
    }

    #[tokio::test]
    async fn test_notify_prefers_closer_predecessor() {
        let node = PeerNode::new(offline_ref(500), &manual_config());
        node.set_predecessor(Some(offline_ref(100))).await.unwrap();

        // 300 sits in (100, 500): closer, adopted
        node.notify(offline_ref(300)).await.unwrap();
        assert_eq!(node.predecessor().await.unwrap(), Some(offline_ref(300)));

        // 200 is behind the current predecessor: ignored
        node.notify(offline_ref(200)).await.unwrap();
        assert_eq!(node.predecessor().await.unwrap(), Some(offline_ref(300)));

        // 700 is past the peer itself: ignored
        node.notify(offline_ref(700)).await.unwrap();
        assert_eq!(node.predecessor().await.unwrap(), Some(offline_ref(300)));
    }

    #[tokio::test]
    async fn test_notify_with_wrapping_predecessor() {
        let node = PeerNode::new(offline_ref(100), &manual_config());
        node.set_predecessor(Some(offline_ref(800))).await.unwrap();

        node.notify(offline_ref(0)).await.unwrap();
        assert_eq!(node.predecessor().await.unwrap(), Some(offline_ref(0)));
    }

    #[tokio::test]
    async fn test_storage_put_get_overwrite() {
        let node = PeerNode::new(offline_ref(100), &manual_config());

        node.put("La Merenda".to_string(), "Pâtes au pistou".to_string())
            .unwrap();
        assert_eq!(
            node.get("La Merenda").unwrap().as_deref(),
            Some("Pâtes au pistou")
        );

        node.put("La Merenda".to_string(), "Tripes".to_string()).unwrap();
        assert_eq!(node.get("La Merenda").unwrap().as_deref(), Some("Tripes"));
        assert_eq!(node.directory_len(), 1);

        assert_eq!(node.get("toto").unwrap(), None);
    }

    #[tokio::test]
    async fn test_describe_is_stable() {
        let node = PeerNode::new(offline_ref(100), &manual_config());
        node.set_successor(offline_ref(200)).await.unwrap();
        node.set_predecessor(None).await.unwrap();
        node.put("b".to_string(), "y".to_string()).unwrap();
        node.put("a".to_string(), "x".to_string()).unwrap();

        assert_eq!(
            node.describe().await.unwrap(),
            "Peer [id=100, successor=200, predecessor=none, values=[(a;x), (b;y)]]"
        );

        node.set_predecessor(Some(offline_ref(0))).await.unwrap();
        assert!(node.describe().await.unwrap().contains("predecessor=0,"));
    }

    #[tokio::test]
    async fn test_dead_peer_rejects_every_call() {
        let node = PeerNode::new(offline_ref(100), &manual_config());
        node.die().await;
        node.die().await;

        assert!(!node.is_alive());
        assert!(matches!(
            node.find_successor(id(5)).await,
            Err(RingError::PeerGone(gone)) if gone == id(100)
        ));
        assert!(matches!(node.get("x"), Err(RingError::PeerGone(_))));
        assert!(matches!(
            node.put("x".to_string(), "y".to_string()),
            Err(RingError::PeerGone(_))
        ));
        assert!(matches!(node.stabilize().await, Err(RingError::PeerGone(_))));
    }

    // ============================================================
    // NETWORKED RING TESTS
    // ============================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_peers_link_up() {
        let nodes = build_ring(&[0, 500], manual_config()).await;
        let (a, b) = (&nodes[0], &nodes[1]);

        assert_eq!(b.successor().await.unwrap(), a.me());

        stabilize_until_converged(&nodes, 5).await;

        assert_eq!(a.successor().await.unwrap(), b.me());
        assert_eq!(a.predecessor().await.unwrap(), Some(b.me()));
        assert_eq!(b.successor().await.unwrap(), a.me());
        assert_eq!(b.predecessor().await.unwrap(), Some(a.me()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_ring_converges_from_arbitrary_join_order() {
        let ids = [0, 500, 200, 900, 100, 700, 300, 800, 400, 600];
        let nodes = build_ring(&ids, manual_config()).await;

        let rounds = stabilize_until_converged(&nodes, 50).await;
        assert!(rounds <= 50);

        let walk = walk_ids(&nodes[0].me(), 20).await.unwrap();
        assert_eq!(walk, vec![100, 200, 300, 400, 500, 600, 700, 800, 900, 0]);

        for node in &nodes {
            let predecessor = node.predecessor().await.unwrap().unwrap();
            let expected = (node.id().value() + 900) % 1000;
            assert_eq!(predecessor.id.value(), expected);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_routing_after_convergence() {
        let ids = [0, 300, 100, 900, 600, 200, 800, 500, 400, 700];
        let nodes = build_ring(&ids, manual_config()).await;
        stabilize_until_converged(&nodes, 50).await;

        let mut sorted: Vec<u32> = ids.iter().map(|v| *v as u32).collect();
        sorted.sort();

        let client = client();
        for key in [0u32, 1, 99, 100, 101, 450, 899, 900, 901, 999, 5_000] {
            let owner_id = expected_owner(&sorted, key);
            for node in &nodes {
                let owner = client.find_successor(&node.me(), id(key as u64)).await.unwrap();
                assert_eq!(
                    owner.id.value(),
                    owner_id,
                    "key {} asked at {} should land on {}",
                    key,
                    node.id(),
                    owner_id
                );
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_background_stabilizer_converges() {
        let config = manual_config().with_stabilize_interval(Duration::from_millis(50));
        let nodes = build_ring(&[0, 400, 200, 800, 600], config).await;

        let deadline = tokio::time::Instant::now() + Duration::from_secs(15);
        while !is_converged(&nodes).await {
            assert!(
                tokio::time::Instant::now() < deadline,
                "background stabilization did not converge in time"
            );
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        for node in &nodes {
            node.die().await;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_remote_accessors_and_mutators() {
        let node = spawn_peer(300, manual_config()).await;
        let client = client();
        let me = node.me();

        assert_eq!(client.id(&me).await.unwrap(), id(300));

        client.create(&me).await.unwrap();
        // the first timer round may already have notified the peer about itself
        let predecessor = client.predecessor(&me).await.unwrap();
        assert!(predecessor.is_none() || predecessor == Some(me));
        assert_eq!(client.successor(&me).await.unwrap(), me);

        client.set_predecessor(&me, Some(offline_ref(100))).await.unwrap();
        client.set_successor(&me, offline_ref(500)).await.unwrap();
        assert_eq!(client.predecessor(&me).await.unwrap(), Some(offline_ref(100)));
        assert_eq!(client.successor(&me).await.unwrap(), offline_ref(500));

        let description = client.describe(&me).await.unwrap();
        assert!(description.starts_with("Peer [id=300, successor=500, predecessor=100"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_remote_storage_round_trip() {
        let nodes = build_ring(&[0, 100, 200, 300], manual_config()).await;
        stabilize_until_converged(&nodes, 20).await;
        let client = client();

        let restaurant = "Le Bistrot Gourmand";
        let owner = client
            .find_successor(&nodes[3].me(), Key::new(restaurant).id())
            .await
            .unwrap();
        assert_eq!(owner.id, id(100), "key 100 is owned by peer 100");

        client.put(&owner, restaurant, "Filet de boeuf").await.unwrap();
        assert_eq!(
            client.get(&owner, restaurant).await.unwrap().as_deref(),
            Some("Filet de boeuf")
        );
        assert_eq!(client.get(&owner, "toto").await.unwrap(), None);

        // stored on the owner only
        assert_eq!(nodes[1].directory_len(), 1);
        assert_eq!(nodes[0].directory_len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_remote_stabilize_and_notify() {
        let nodes = build_ring(&[0, 600], manual_config()).await;
        let client = client();

        client.stabilize(&nodes[1].me()).await.unwrap();
        assert_eq!(nodes[0].predecessor().await.unwrap(), Some(nodes[1].me()));

        client.notify(&nodes[1].me(), nodes[0].me()).await.unwrap();
        assert_eq!(nodes[1].predecessor().await.unwrap(), Some(nodes[0].me()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_dead_peer_answers_gone() {
        let nodes = build_ring(&[0, 300, 600], manual_config()).await;
        stabilize_until_converged(&nodes, 20).await;
        let client = client();

        client.die(&nodes[1].me()).await.unwrap();
        assert!(!nodes[1].is_alive());

        let dead = nodes[1].id();
        assert!(matches!(
            client.successor(&nodes[1].me()).await,
            Err(RingError::PeerGone(gone)) if gone == dead
        ));
        assert!(matches!(
            client.get(&nodes[1].me(), "anything").await,
            Err(RingError::PeerGone(gone)) if gone == dead
        ));
        assert!(matches!(
            client.die(&nodes[1].me()).await,
            Err(RingError::PeerGone(gone)) if gone == dead
        ));

        // the neighbour still points at the dead peer: its rounds fail but do not panic
        assert!(matches!(
            nodes[0].stabilize().await,
            Err(RingError::PeerGone(gone)) if gone == dead
        ));

        // lookups relayed through the dead peer fail at the relay, not at the caller
        let err = client
            .find_successor(&nodes[0].me(), id(450))
            .await
            .unwrap_err();
        assert!(
            matches!(err, RingError::Remote { status, .. } if status == StatusCode::BAD_GATEWAY),
            "unexpected error {:?}",
            err
        );

        // a lookup answered from the stale link of peer 0 still names the dead peer
        let owner = client.find_successor(&nodes[2].me(), id(50)).await.unwrap();
        assert_eq!(owner.id, dead);

        // a lookup that only crosses live peers lands on a live owner
        let owner = client.find_successor(&nodes[2].me(), id(950)).await.unwrap();
        assert_eq!(owner.id, id(0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stabilizer_keeps_running_after_failed_rounds() {
        let ticking = manual_config().with_stabilize_interval(Duration::from_millis(50));
        let a = spawn_peer(0, ticking).await;
        let b = spawn_peer(500, manual_config()).await;
        let gone = spawn_peer(300, manual_config()).await;

        b.create().await.unwrap();
        gone.die().await;

        a.create().await.unwrap();
        a.set_successor(gone.me()).await.unwrap();

        // several rounds fail against the dead successor, which stays in place
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(a.is_alive());
        assert_eq!(a.successor().await.unwrap(), gone.me());
        assert_ne!(b.predecessor().await.unwrap(), Some(a.me()));

        a.set_successor(b.me()).await.unwrap();

        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        while b.predecessor().await.unwrap() != Some(a.me()) {
            assert!(
                tokio::time::Instant::now() < deadline,
                "timer rounds stopped after failing"
            );
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        a.die().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stabilizer_first_round_is_immediate() {
        let b = spawn_peer(500, manual_config()).await;
        b.create().await.unwrap();

        let a = PeerNode::new(offline_ref(0), &manual_config());
        a.create().await.unwrap();
        a.set_successor(b.me()).await.unwrap();

        let handle = Stabilizer::new(&a, Duration::from_secs(3600)).start();

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while b.predecessor().await.unwrap() != Some(a.me()) {
            assert!(
                tokio::time::Instant::now() < deadline,
                "first round waited for a full period"
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        handle.abort();
    }
}
