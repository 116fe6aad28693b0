//! Peer Network Protocol
//!
//! Endpoints and Data Transfer Objects of the peer-to-peer calls.
//!
//! Every ring operation is a blocking request/response: the caller awaits the reply
//! before going on. A dead peer answers every endpoint with `410 Gone`.

use super::types::PeerRef;
use crate::ring::Identifier;
use serde::{Deserialize, Serialize};

// --- Ring maintenance ---

/// Turns the peer into a single-member ring.
pub const ENDPOINT_CREATE: &str = "/peer/create";
/// Makes the peer join the ring through a landmark.
pub const ENDPOINT_JOIN: &str = "/peer/join";
/// Routes an identifier to the peer owning it.
pub const ENDPOINT_FIND_SUCCESSOR: &str = "/peer/find_successor";
pub const ENDPOINT_ID: &str = "/peer/id";
/// GET reads the predecessor, POST overwrites it.
pub const ENDPOINT_PREDECESSOR: &str = "/peer/predecessor";
/// GET reads the successor, POST overwrites it.
pub const ENDPOINT_SUCCESSOR: &str = "/peer/successor";
/// Runs one stabilization round right away.
pub const ENDPOINT_STABILIZE: &str = "/peer/stabilize";
/// Tells the peer that the sender may be its predecessor.
pub const ENDPOINT_NOTIFY: &str = "/peer/notify";

// --- Storage ---

pub const ENDPOINT_PUT: &str = "/peer/put";
pub const ENDPOINT_GET: &str = "/peer/get";

// --- Diagnostics & lifecycle ---

pub const ENDPOINT_DESCRIBE: &str = "/peer/describe";
/// Kills the peer without handing over its links or entries.
pub const ENDPOINT_DIE: &str = "/peer/die";

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinRequest {
    pub landmark: PeerRef,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FindSuccessorRequest {
    pub id: Identifier,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: Identifier,
}

/// A peer handle, used for successor reads/writes and `find_successor` replies.
#[derive(Debug, Serialize, Deserialize)]
pub struct PeerMessage {
    pub peer: PeerRef,
}

/// Predecessor reads and writes; `None` means unknown.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredecessorMessage {
    pub peer: Option<PeerRef>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PutRequest {
    pub restaurant: String,
    pub daily_special: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetRequest {
    pub restaurant: String,
}

/// `daily_special` is `None` when the restaurant is not stored on the peer.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetResponse {
    pub daily_special: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DescribeResponse {
    pub description: String,
}
