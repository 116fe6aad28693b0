//! Tracker Network Protocol

use crate::peer::PeerRef;
use serde::{Deserialize, Serialize};

/// Adds a peer; answers `409 Conflict` when its identifier is already known.
pub const ENDPOINT_REGISTER: &str = "/tracker/register";
/// Any registered peer, chosen uniformly.
pub const ENDPOINT_RANDOM_PEER: &str = "/tracker/random_peer";
/// Every registered peer, in registration order.
pub const ENDPOINT_PEERS: &str = "/tracker/peers";

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub peer: PeerRef,
}

/// `peer` is `None` when nobody registered yet.
#[derive(Debug, Serialize, Deserialize)]
pub struct RandomPeerResponse {
    pub peer: Option<PeerRef>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PeersResponse {
    pub peers: Vec<PeerRef>,
}
