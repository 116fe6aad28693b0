use super::identifier::{Identifier, RING_BITS};
use sha1::{Digest, Sha1};
use std::fmt;

/// Number of slots a digest is folded into before scaling.
const KEY_INTERVAL: i32 = RING_BITS as i32;

/// Spreads the folded slot over hand-picked peer identifiers (multiples of 100).
const KEY_SCALE: u32 = 100;

/// Ring position of a restaurant name.
///
/// The SHA-1 digest is read as a signed big-endian integer, its absolute value is
/// truncated to 32 bits, folded into `[0, KEY_INTERVAL)` and scaled by `KEY_SCALE`.
/// Equal names always map to the same key; distinct names may collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(Identifier);

impl Key {
    pub fn new(name: &str) -> Self {
        let digest = Sha1::digest(name.as_bytes());

        // Low 32 bits of |digest|: negating a two's complement value only
        // depends on the low bits, so the 160-bit magnitude is never needed.
        let mut low = u32::from_be_bytes([digest[16], digest[17], digest[18], digest[19]]);
        if digest[0] & 0x80 != 0 {
            low = low.wrapping_neg();
        }

        let signed = low as i32;
        let slot = (signed % KEY_INTERVAL + KEY_INTERVAL) % KEY_INTERVAL;

        Self(Identifier(slot as u32 * KEY_SCALE))
    }

    pub fn id(&self) -> Identifier {
        self.0
    }
}

impl From<Key> for Identifier {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
