//! Tracker Module
//!
//! Discovery directory for the ring. Peers register once they are in the ring and
//! callers ask for any registered peer to use as an entry point. The tracker takes no
//! part in routing.
//!
//! Registrations are never removed: a peer that died stays listed, and callers that
//! pick it get a transport error.

pub mod client;
pub mod handlers;
pub mod protocol;
pub mod service;

pub use client::TrackerClient;
pub use service::{Tracker, TrackerServer};
