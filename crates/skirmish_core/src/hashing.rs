//! Stable FNV-1a hashing for fingerprints that outlive the process.
//!
//! `DefaultHasher` is fine for in-process comparisons but its algorithm may
//! change between toolchains, so anything written to disk is hashed here
//! instead. Values are fed as their bincode encoding, which is fixed for
//! bincode 1.x.

use std::hash::Hasher;
use std::io;

use serde::Serialize;

/// A deterministic FNV-1a 64-bit hasher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    /// Fresh hasher at the offset basis.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }

    /// Mix in the bincode encoding of `value`.
    pub fn absorb<T: Serialize + ?Sized>(&mut self, value: &T) {
        if let Err(e) = bincode::serialize_into(&mut *self, value) {
            tracing::warn!(error = %e, "value could not be encoded for hashing");
        }
    }
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

impl io::Write for FnvHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Hasher::write(self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{SimEvent, Winner};

    fn fnv(bytes: &[u8]) -> u64 {
        let mut hasher = FnvHasher::new();
        Hasher::write(&mut hasher, bytes);
        hasher.finish()
    }

    #[test]
    fn test_reference_vectors() {
        assert_eq!(fnv(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv(b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv(b"foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn test_absorb_hashes_bincode_bytes() {
        let event = SimEvent::End {
            winner: Winner::Heroes,
        };
        let mut hasher = FnvHasher::new();
        hasher.absorb(&event);
        assert_eq!(hasher.finish(), fnv(&bincode::serialize(&event).unwrap()));
    }

    #[test]
    fn test_order_matters() {
        let (a, b) = (
            SimEvent::End {
                winner: Winner::Heroes,
            },
            SimEvent::End {
                winner: Winner::Monsters,
            },
        );
        let mut forward = FnvHasher::new();
        forward.absorb(&a);
        forward.absorb(&b);
        let mut backward = FnvHasher::new();
        backward.absorb(&b);
        backward.absorb(&a);
        assert_ne!(forward.finish(), backward.finish());
    }
}
