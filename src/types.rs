//! Core types shared by the address codec and block validators

use serde::{Deserialize, Serialize};

/// Hash type: 256-bit hash in internal (little-endian) byte order
pub type Hash = [u8; 32];

/// Read-only view of a stored block, supplied by the surrounding sync engine.
///
/// Ancestry beyond `prev_hash` is resolved externally through
/// [`crate::window::BlockWindowProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub height: u64,
    pub timestamp: u64,
    pub header_hash: Hash,
    pub prev_hash: Hash,
    pub bits: u32,
}

/// A hard-fork activation point: the height at which a new rule becomes
/// mandatory, paired with the community-agreed hash of the block at that
/// height. The hash is a one-time sanity pin, not an ongoing check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkActivation {
    pub height: u64,
    pub expected_header_hash: Hash,
}

/// Address kind carried in the version byte's type bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressType {
    PubKeyHash,
    ScriptHash,
}

impl AddressType {
    /// Type bits as packed into bits 3-6 of the version byte.
    pub fn type_bits(self) -> u8 {
        match self {
            AddressType::PubKeyHash => 0x00,
            AddressType::ScriptHash => 0x08,
        }
    }
}

/// Locking-script templates the codec knows how to map to an address kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptType {
    P2pkh,
    P2pk,
    P2sh,
    P2wpkh,
    NullData,
}

/// Half-open `[start, end)` height range; `end == None` means unbounded.
///
/// Validators carry their applicability as one of these so chain assembly
/// can check the coverage invariant mechanically instead of probing an
/// opaque predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightRange {
    start: u64,
    end: Option<u64>,
}

impl HeightRange {
    /// Unbounded range starting at `start`.
    pub const fn from_height(start: u64) -> Self {
        Self { start, end: None }
    }

    /// Range covering `[start, end)`.
    pub const fn bounded(start: u64, end: u64) -> Self {
        Self { start, end: Some(end) }
    }

    /// Range covering exactly one height.
    pub const fn at(height: u64) -> Self {
        Self { start: height, end: Some(height + 1) }
    }

    pub const fn start(&self) -> u64 {
        self.start
    }

    pub const fn end(&self) -> Option<u64> {
        self.end
    }

    pub fn contains(&self, height: u64) -> bool {
        height >= self.start && self.end.map_or(true, |end| height < end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_range_contains() {
        let bounded = HeightRange::bounded(10, 20);
        assert!(!bounded.contains(9));
        assert!(bounded.contains(10));
        assert!(bounded.contains(19));
        assert!(!bounded.contains(20));

        let open = HeightRange::from_height(5);
        assert!(open.contains(5));
        assert!(open.contains(u64::MAX));
        assert!(!open.contains(4));
    }

    #[test]
    fn test_height_range_singleton() {
        let range = HeightRange::at(661_648);
        assert!(range.contains(661_648));
        assert!(!range.contains(661_647));
        assert!(!range.contains(661_649));
    }

    #[test]
    fn test_block_serde_round_trip() {
        let block = Block {
            height: 556_767,
            timestamp: 1_542_304_321,
            header_hash: [0xab; 32],
            prev_hash: [0xcd; 32],
            bits: 0x1802_5dcb,
        };
        let json = serde_json::to_string(&block).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);
    }
}
