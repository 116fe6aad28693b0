//! Chord Peer Module
//!
//! A peer owns the arc of the ring that ends at its identifier and serves the
//! restaurant entries whose key falls in that arc.
//!
//! ## Core Mechanisms
//! - **Routing**: `find_successor` forwards hop by hop along successor links until the
//!   identifier falls between a peer and its successor.
//! - **Stabilization**: each peer periodically asks its successor for its predecessor,
//!   adopts it when it sits in between, then notifies the successor about itself.
//! - **Transport**: peers talk JSON over HTTP; a [`types::PeerRef`] (id + address) is
//!   all a peer needs to reach another one, so a ring can span processes.
//!
//! ## Submodules
//! - **`service`**: `PeerNode`, the local state, ring protocol, storage and lifecycle.
//! - **`client`**: `PeerClient`, the HTTP stub used to call remote peers.
//! - **`handlers`**: axum handlers exposing a `PeerNode`.
//! - **`stabilizer`**: the recurring background task.
//! - **`protocol`**: endpoints and DTOs.

pub mod client;
pub mod handlers;
pub mod protocol;
pub mod service;
pub mod stabilizer;
pub mod types;

pub use client::PeerClient;
pub use service::PeerNode;
pub use types::PeerRef;

#[cfg(test)]
mod tests;
