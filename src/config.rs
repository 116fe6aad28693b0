//! Runtime configuration.
//!
//! `PeerConfig` tunes a single peer (stabilization cadence, remote call timeout).
//! `DemoConfig` holds the command line of the `chord_ring` binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const STABILIZE_INTERVAL: Duration = Duration::from_millis(500);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_PEERS: usize = 10;
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_ROUNDS: usize = 10;
pub const DEFAULT_DATA_FILE: &str = "data/restaurants.txt";

#[derive(Debug, Clone)]
pub struct PeerConfig {
    pub stabilize_interval: Duration,
    pub request_timeout: Duration,
}

impl PeerConfig {
    pub fn with_stabilize_interval(mut self, interval: Duration) -> Self {
        self.stabilize_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            stabilize_interval: STABILIZE_INTERVAL,
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

/// What the binary should run.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Tracker and every peer inside one process.
    Demo,
    /// A standalone tracker.
    Tracker { bind: SocketAddr },
    /// A standalone peer joining through the tracker at `tracker`.
    Peer {
        bind: SocketAddr,
        id: u64,
        tracker: SocketAddr,
    },
}

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub mode: Mode,
    pub peers: usize,
    pub batch_size: usize,
    pub rounds: usize,
    pub data_file: PathBuf,
    pub verbose: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Demo,
            peers: DEFAULT_PEERS,
            batch_size: DEFAULT_BATCH_SIZE,
            rounds: DEFAULT_ROUNDS,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            verbose: false,
        }
    }
}

impl DemoConfig {
    /// Parses `args` (without the program name).
    ///
    /// The first positional argument selects the mode (`demo`, `tracker`, `peer`),
    /// everything else is `--flag value` pairs.
    pub fn from_args(args: &[String]) -> anyhow::Result<Self> {
        let mut config = DemoConfig::default();
        let mut mode = "demo".to_string();
        let mut bind: Option<SocketAddr> = None;
        let mut tracker: Option<SocketAddr> = None;
        let mut id: Option<u64> = None;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--verbose" | "-v" => {
                    config.verbose = true;
                    i += 1;
                    continue;
                }
                flag if flag.starts_with("--") => {
                    let value = args
                        .get(i + 1)
                        .ok_or_else(|| anyhow::anyhow!("missing value for {}", flag))?;
                    match flag {
                        "--peers" => config.peers = value.parse()?,
                        "--batch" => config.batch_size = value.parse()?,
                        "--rounds" => config.rounds = value.parse()?,
                        "--data" => config.data_file = PathBuf::from(value),
                        "--bind" => bind = Some(value.parse()?),
                        "--tracker" => tracker = Some(value.parse()?),
                        "--id" => id = Some(value.parse()?),
                        _ => anyhow::bail!("unknown option {}", flag),
                    }
                    i += 2;
                }
                positional => {
                    mode = positional.to_string();
                    i += 1;
                }
            }
        }

        config.mode = match mode.as_str() {
            "demo" => Mode::Demo,
            "tracker" => Mode::Tracker {
                bind: bind.ok_or_else(|| anyhow::anyhow!("tracker mode requires --bind"))?,
            },
            "peer" => Mode::Peer {
                bind: bind.ok_or_else(|| anyhow::anyhow!("peer mode requires --bind"))?,
                id: id.ok_or_else(|| anyhow::anyhow!("peer mode requires --id"))?,
                tracker: tracker
                    .ok_or_else(|| anyhow::anyhow!("peer mode requires --tracker"))?,
            },
            other => anyhow::bail!("unknown mode {}", other),
        };

        if config.peers == 0 {
            anyhow::bail!("--peers must be at least 1");
        }

        Ok(config)
    }
}
