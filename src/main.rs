use chord_ring::config::{DemoConfig, Mode, PeerConfig, REQUEST_TIMEOUT};
use chord_ring::guide::{DataFeed, Guide};
use chord_ring::peer::{PeerClient, PeerNode, PeerRef};
use chord_ring::ring::Identifier;
use chord_ring::tracker::{TrackerClient, TrackerServer};
use chord_ring::RingError;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

const LOCALHOST: &str = "127.0.0.1:0";

/// Restaurants looked up at the end of the demo; the last one is unknown on purpose.
const QUERIES: [&str; 3] = ["Le Bistrot Gourmand", "Auberge de la Madone", "toto"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match DemoConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: chord_ring [demo] [--peers N] [--batch B] [--rounds R] [--data PATH] [-v]");
            eprintln!("       chord_ring tracker --bind <addr:port>");
            eprintln!("       chord_ring peer --bind <addr:port> --id <id> --tracker <addr:port>");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(if config.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match config.mode.clone() {
        Mode::Demo => run_demo(&config).await,
        Mode::Tracker { bind } => run_tracker(bind).await,
        Mode::Peer { bind, id, tracker } => run_peer(bind, id, tracker).await,
    }
}

async fn run_demo(config: &DemoConfig) -> anyhow::Result<()> {
    // 1. Tracker:
    let tracker = TrackerServer::spawn(LOCALHOST.parse()?).await?;
    let tracker_client = TrackerClient::new(tracker.addr, REQUEST_TIMEOUT);
    let peer_client = PeerClient::new(REQUEST_TIMEOUT);

    // 2. Ring:
    let nodes = create_network(config.peers, &tracker_client, &peer_client).await?;

    // 3. Let stabilization converge, twice:
    let settle = Duration::from_secs_f64((config.peers as f64).ln().max(1.0));
    for label in ["first", "second"] {
        tokio::time::sleep(settle).await;
        tracing::info!("Turn around after {} stabilization", label);
        turn_around(&tracker_client, &peer_client, config.peers).await?;
    }

    // 4. Feed the guide:
    let guide = Guide::new(tracker_client.clone(), peer_client.clone());
    let mut feed = DataFeed::from_file(&config.data_file, config.batch_size)?;

    for _ in 0..config.rounds {
        for (restaurant, daily_special) in feed.next_batch() {
            guide.put(&restaurant, &daily_special).await?;
        }
    }

    tokio::time::sleep(Duration::from_secs(2)).await;
    tracing::info!("Turn around after adding data");
    turn_around(&tracker_client, &peer_client, config.peers).await?;

    // 5. Lookups:
    for restaurant in QUERIES {
        let daily_special = guide.get(restaurant).await?;
        tracing::info!(
            "Restaurant '{}' - Daily special: '{}'",
            restaurant,
            daily_special.as_deref().unwrap_or("none")
        );
    }

    for node in nodes {
        node.die().await;
    }

    Ok(())
}

/// Boots `count` peers with ids 0, 100, 200, ... The first one creates the ring, the
/// others join through a random registered peer.
async fn create_network(
    count: usize,
    tracker: &TrackerClient,
    peers: &PeerClient,
) -> anyhow::Result<Vec<Arc<PeerNode>>> {
    let mut nodes = Vec::with_capacity(count);

    for i in 0..count {
        let id = Identifier::new(i as u64 * 100)?;
        let node = PeerNode::spawn(id, LOCALHOST.parse()?, PeerConfig::default()).await?;

        if i == 0 {
            node.create().await?;
        } else {
            let landmark = tracker.random_peer().await?.ok_or(RingError::NoPeers)?;
            let landmark_successor = peers.successor(&landmark).await?;
            tracing::info!(
                "Added {} from {} that points to {}",
                id,
                landmark.id,
                landmark_successor.id
            );
            node.join(&landmark).await?;
        }

        tracker.register(node.me()).await?;
        nodes.push(node);
    }

    Ok(nodes)
}

/// Walks the ring from a random peer and logs every visited peer.
async fn turn_around(
    tracker: &TrackerClient,
    peers: &PeerClient,
    ring_size: usize,
) -> anyhow::Result<()> {
    let start: PeerRef = tracker.random_peer().await?.ok_or(RingError::NoPeers)?;
    tracing::info!("Started turn around from {}", start.id);

    match peers.walk(&start, ring_size * 2).await {
        Ok(visited) => {
            for peer in visited {
                tracing::info!("Visited {}", peers.describe(&peer).await?);
            }
        }
        Err(e) => tracing::warn!("Ring not converged yet: {}", e),
    }

    Ok(())
}

async fn run_tracker(bind: SocketAddr) -> anyhow::Result<()> {
    let mut tracker = TrackerServer::spawn(bind).await?;
    tracing::info!("Press Ctrl+C to shutdown");

    tokio::signal::ctrl_c().await?;
    tracker.shutdown();
    Ok(())
}

async fn run_peer(bind: SocketAddr, id: u64, tracker_addr: SocketAddr) -> anyhow::Result<()> {
    let tracker = TrackerClient::new(tracker_addr, REQUEST_TIMEOUT);
    let node = PeerNode::spawn(Identifier::new(id)?, bind, PeerConfig::default()).await?;

    match tracker.random_peer().await? {
        Some(landmark) => {
            tracing::info!("Joining ring through {}", landmark);
            node.join(&landmark).await?;
        }
        None => {
            tracing::info!("No peer registered, starting a new ring");
            node.create().await?;
        }
    }
    tracker.register(node.me()).await?;

    // Stats reporter:
    let stats_node = node.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        loop {
            interval.tick().await;
            match stats_node.describe().await {
                Ok(description) => tracing::info!("{}", description),
                Err(_) => break,
            }
        }
    });

    tracing::info!("Press Ctrl+C to shutdown");
    tokio::signal::ctrl_c().await?;
    node.die().await;

    Ok(())
}
