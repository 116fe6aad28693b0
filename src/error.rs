//! Error types shared by the ring, tracker and guide modules.
//!
//! Absence is never an error here: lookups for unknown restaurants and an
//! empty tracker are reported as `None` by the services. The facade is the
//! only place that turns "no peers" into [`RingError::NoPeers`], because it
//! cannot route without an entry point.

use crate::ring::Identifier;
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum RingError {
    /// Identifier value outside of `[0, RING_SIZE)`.
    #[error("invalid identifier value: {0}")]
    InvalidIdentifier(u64),

    /// A peer with the same identifier is already known to the tracker.
    #[error("peer with id {0} is already registered")]
    AlreadyRegistered(Identifier),

    /// The target peer has died; it no longer serves any call.
    #[error("no such peer: {0} has died")]
    PeerGone(Identifier),

    /// The tracker has no registered peer to route through.
    #[error("no peer registered in the tracker")]
    NoPeers,

    /// The request never got a response (connection refused, timeout, ...).
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote side answered with an unexpected status.
    #[error("remote call failed with {status}: {message}")]
    Remote { status: StatusCode, message: String },

    /// A successor walk did not return to its starting peer.
    #[error("ring walk from {start} did not come back after {hops} hops")]
    RingNotClosed { start: Identifier, hops: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid data feed: {0}")]
    InvalidFeed(String),
}

pub type Result<T> = std::result::Result<T, RingError>;
