use crate::ring::Identifier;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;

/// Addressable handle of a peer.
///
/// Two handles are the same peer iff their identifiers match; the address is only
/// how to reach it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PeerRef {
    pub id: Identifier,
    pub addr: SocketAddr,
}

impl PeerRef {
    pub fn new(id: Identifier, addr: SocketAddr) -> Self {
        Self { id, addr }
    }
}

impl PartialEq for PeerRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PeerRef {}

impl Hash for PeerRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for PeerRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PeerRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for PeerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.addr)
    }
}

/// Successor and predecessor links of a peer.
///
/// The successor is always set; pointing at the peer itself means the ring has a
/// single member. The predecessor is unknown until stabilization finds one.
#[derive(Debug, Clone)]
pub struct RingLinks {
    pub successor: PeerRef,
    pub predecessor: Option<PeerRef>,
}

impl RingLinks {
    pub fn self_loop(me: PeerRef) -> Self {
        Self {
            successor: me,
            predecessor: Some(me),
        }
    }

    pub fn is_singleton(&self, me: &PeerRef) -> bool {
        self.successor == *me
    }
}
