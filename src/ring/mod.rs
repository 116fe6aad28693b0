//! Ring Identifier Space
//!
//! Points on the Chord ring and the circular interval tests used for routing.
//!
//! ## Core Concepts
//! - **Identifier**: an integer in `[0, RING_SIZE)`; plain integer ordering is only
//!   a building block, ring decisions always go through the circular predicates.
//! - **Key**: an identifier derived from a restaurant name with SHA-1, so any peer can
//!   compute which part of the ring owns a given entry.

pub mod identifier;
pub mod key;

pub use identifier::{Identifier, RING_BITS, RING_SIZE};
pub use key::Key;

#[cfg(test)]
mod tests;
