use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Fixed-size cryptographic digest, the universal key type of VWS.
///
/// A `Hash` is a 32-byte BLAKE3 digest. It is totally ordered by byte
/// value for storage purposes and supports deterministic combination
/// operators used to derive storage keys from (context, data) pairs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash([u8; 32]);

impl Hash {
    /// Number of bytes in a digest.
    pub const LEN: usize = 32;

    /// Compute the digest of raw bytes.
    pub fn of(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Wrap a pre-computed 32-byte digest.
    pub const fn from_digest(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    /// The zero digest (all zeros). The default/genesis block digest.
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Returns `true` if this is the zero digest.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Order-sensitive combination of two digests.
    ///
    /// `a.combine(&b)` and `b.combine(&a)` are distinct digests; the
    /// result is pure and deterministic, so derived keys never require a
    /// lookup to recompute.
    pub fn combine(&self, other: &Hash) -> Hash {
        self.combine_bytes(&other.0)
    }

    /// Order-sensitive combination of a digest with raw bytes.
    pub fn combine_bytes(&self, bytes: &[u8]) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.0);
        hasher.update(bytes);
        Self(*hasher.finalize().as_bytes())
    }

    /// Combination with the raw-byte operand reversed before mixing.
    ///
    /// Keys derived via `combine_bytes` and `combine_reverse` from the
    /// same prefix occupy disjoint regions of the digest space, which lets
    /// a single block digest anchor several independent key families (a
    /// count slot vs. per-index slots) without collisions.
    pub fn combine_reverse(&self, bytes: &[u8]) -> Hash {
        let mut reversed = bytes.to_vec();
        reversed.reverse();
        self.combine_bytes(&reversed)
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != Self::LEN {
            return Err(TypeError::InvalidLength {
                expected: Self::LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl Default for Hash {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.short_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Hash> for [u8; 32] {
    fn from(hash: Hash) -> Self {
        hash.0
    }
}
