//! Per-network parameters
//!
//! Fork heights, pinned hashes and the ASERT anchor are configuration data
//! handed to the assembly functions, not compiled-in globals, so test
//! suites can swap in synthetic fork points.

use serde::{Deserialize, Serialize};

use crate::asert::AsertAnchor;
use crate::constants::*;
use crate::types::ForkActivation;

/// Which Bitcoin Cash network an address or validator set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// CashAddr prefix for this network.
    pub fn address_prefix(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_ADDRESS_PREFIX,
            Network::Testnet => TESTNET_ADDRESS_PREFIX,
        }
    }
}

/// Everything the difficulty-rule chain needs to know about one chain's
/// fork history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    /// First height after the split from the ancestor chain; start of the
    /// EDA era.
    pub eda_fork_height: u64,
    /// First height governed by cw-144.
    pub daa_fork_height: u64,
    /// Chain-split block pinned against the sibling fork.
    pub sv_fork: ForkActivation,
    /// ASERT activation block, pinned and the start of the ASERT era.
    pub bchn_fork: ForkActivation,
    pub asert_anchor: AsertAnchor,
    pub asert_half_life: i64,
    pub legacy_height_interval: u64,
    pub daa_height_interval: u64,
    pub target_spacing: u64,
    pub max_target_bits: u32,
}

impl ChainParams {
    /// Main-network fork history.
    pub fn mainnet() -> Self {
        Self {
            eda_fork_height: EDA_FORK_HEIGHT,
            daa_fork_height: DAA_FORK_HEIGHT,
            sv_fork: ForkActivation {
                height: SV_FORK_HEIGHT,
                expected_header_hash: SV_FORK_BLOCK_HASH,
            },
            bchn_fork: ForkActivation {
                height: BCHN_FORK_HEIGHT,
                expected_header_hash: BCHN_FORK_BLOCK_HASH,
            },
            asert_anchor: AsertAnchor {
                height: ASERT_ANCHOR_HEIGHT,
                bits: ASERT_ANCHOR_BITS,
                parent_timestamp: ASERT_ANCHOR_PARENT_TIMESTAMP,
            },
            asert_half_life: ASERT_HALF_LIFE,
            legacy_height_interval: LEGACY_HEIGHT_INTERVAL,
            daa_height_interval: DAA_HEIGHT_INTERVAL,
            target_spacing: TARGET_SPACING,
            max_target_bits: MAX_TARGET_BITS,
        }
    }
}
