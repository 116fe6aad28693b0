//! Chord Ring Daily Special Directory
//!
//! This library crate defines the modules of a Chord-style key-value ring.
//! It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of loosely coupled subsystems:
//!
//! - **`ring`**: The identifier space. Circular interval tests and SHA-1 derived keys.
//! - **`peer`**: A ring member served over HTTP. Successor-only routing, periodic
//!   stabilization of successor/predecessor links, and a local directory of entries.
//! - **`tracker`**: The discovery registry. Peers register on joining; callers ask it
//!   for any live entry point into the ring.
//! - **`guide`**: The application facade (`put`/`get` by restaurant name) and the
//!   demo data feed.
//! - **`config`**, **`error`**, **`transport`**: configuration, error types and the
//!   HTTP plumbing shared by the clients.

pub mod config;
pub mod error;
pub mod guide;
pub mod peer;
pub mod ring;
pub mod tracker;
pub mod transport;

pub use error::{Result, RingError};
