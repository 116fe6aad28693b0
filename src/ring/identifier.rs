use crate::error::{Result, RingError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of bits of an identifier.
pub const RING_BITS: u32 = 31;

/// Size of the circular identifier space.
pub const RING_SIZE: u64 = 1 << RING_BITS;

/// A point on the ring.
///
/// `Ord` is the plain integer order. Use [`Identifier::is_between_open_closed`] and
/// [`Identifier::is_between_open_open`] for anything that depends on ring position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Identifier(pub(super) u32);

impl Identifier {
    pub fn new(value: u64) -> Result<Self> {
        if value >= RING_SIZE {
            return Err(RingError::InvalidIdentifier(value));
        }
        Ok(Self(value as u32))
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// True when walking clockwise from `a` (excluded) to `b` (included) passes `self`.
    ///
    /// When `a >= b` the interval wraps through zero; `a == b` covers the whole ring.
    pub fn is_between_open_closed(&self, a: Identifier, b: Identifier) -> bool {
        if a < b {
            *self > a && *self <= b
        } else {
            *self > a || *self <= b
        }
    }

    /// Same as [`Identifier::is_between_open_closed`] with `b` excluded too.
    ///
    /// For `a == b` this holds for every identifier except `a` itself.
    pub fn is_between_open_open(&self, a: Identifier, b: Identifier) -> bool {
        if a < b {
            *self > a && *self < b
        } else {
            *self > a || *self < b
        }
    }
}

impl TryFrom<u64> for Identifier {
    type Error = RingError;

    fn try_from(value: u64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Identifier> for u64 {
    fn from(id: Identifier) -> Self {
        id.0 as u64
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
