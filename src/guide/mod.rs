//! Daily Special Guide
//!
//! Application side of the ring: a facade that stores and reads restaurant entries
//! by routing each name to its owner, and a feed that produces batches of
//! (restaurant, daily special) pairs for the demo.

pub mod facade;
pub mod feed;

pub use facade::Guide;
pub use feed::DataFeed;
