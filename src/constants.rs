//! Bitcoin Cash consensus constants
//!
//! Fork heights and pinned hashes are also reachable as configuration data
//! through [`crate::network::ChainParams`], so tests can substitute
//! synthetic fork points; the values here are the main-network defaults.

/// CashAddr prefix on the main network
pub const MAINNET_ADDRESS_PREFIX: &str = "bitcoincash";

/// CashAddr prefix on the test network
pub const TESTNET_ADDRESS_PREFIX: &str = "bchtest";

/// Initially and maximum target difficulty for blocks (the pow limit)
pub const MAX_TARGET_BITS: u32 = 0x1d00ffff;

/// Block count in the legacy (Bitcoin) difficulty change cycle: 2016 blocks
pub const LEGACY_HEIGHT_INTERVAL: u64 = 2016;

/// Target time to mine one block: 10 minutes
pub const TARGET_SPACING: u64 = 600;

/// Legacy retarget timespan: two weeks
pub const LEGACY_TARGET_TIMESPAN: u64 = LEGACY_HEIGHT_INTERVAL * TARGET_SPACING;

/// Blocks in the rolling window of the cw-144 difficulty algorithm
pub const DAA_HEIGHT_INTERVAL: u64 = 144;

/// Median-time-past window: 11 blocks
pub const MEDIAN_TIME_SPAN: usize = 11;

/// Median-time-past gap that triggers the emergency difficulty adjustment: 12 hours
pub const EDA_RELAX_GAP: u64 = 12 * 3600;

/// ASERT half-life: two days
pub const ASERT_HALF_LIFE: i64 = 2 * 24 * 3600;

/// First height after the split from the ancestor chain (2017 August 1)
pub const EDA_FORK_HEIGHT: u64 = 478_559;

/// First height governed by the cw-144 algorithm (2017 November 13)
pub const DAA_FORK_HEIGHT: u64 = 504_032;

/// Chain-split height against the SV fork (2018 November 14)
pub const SV_FORK_HEIGHT: u64 = 556_767;

/// First height governed by aserti3-2d (2020 November 15)
pub const BCHN_FORK_HEIGHT: u64 = 661_648;

/// Header hash expected at [`SV_FORK_HEIGHT`], internal byte order
/// (displayed 0000000000000000004626ff6e3b936941d341c5932ece4357eeccac44e6d56c)
pub const SV_FORK_BLOCK_HASH: [u8; 32] = [
    0x6c, 0xd5, 0xe6, 0x44, 0xac, 0xcc, 0xee, 0x57,
    0x43, 0xce, 0x2e, 0x93, 0xc5, 0x41, 0xd3, 0x41,
    0x69, 0x93, 0x3b, 0x6e, 0xff, 0x26, 0x46, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Header hash expected at [`BCHN_FORK_HEIGHT`], internal byte order
/// (displayed 0000000000000000029e471c41818d24b8b74c911071c4ef0b4a0509f9b5a8ce)
pub const BCHN_FORK_BLOCK_HASH: [u8; 32] = [
    0xce, 0xa8, 0xb5, 0xf9, 0x09, 0x05, 0x4a, 0x0b,
    0xef, 0xc4, 0x71, 0x10, 0x91, 0x4c, 0xb7, 0xb8,
    0x24, 0x8d, 0x81, 0x41, 0x1c, 0x47, 0x9e, 0x02,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Height of the main-network ASERT anchor block
pub const ASERT_ANCHOR_HEIGHT: u64 = 661_647;

/// Compact bits of the main-network ASERT anchor block
pub const ASERT_ANCHOR_BITS: u32 = 0x1804dafe;

/// Timestamp of the ASERT anchor block's parent
pub const ASERT_ANCHOR_PARENT_TIMESTAMP: u64 = 1_605_447_844;
