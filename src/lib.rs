//! # bitcoincash-consensus
//!
//! Consensus-sensitive pieces a Bitcoin Cash node layers on top of a
//! generic Bitcoin engine:
//!
//! - A [`CashAddressCodec`] implementing the checksummed CashAddr format,
//!   with a packed version byte that jointly encodes address type and
//!   payload length and strict round-trip validation.
//! - A fork-aware [`BlockValidatorChain`] that routes each block to exactly
//!   one difficulty rule by height, with [`ForkValidator`] pinning the
//!   expected header hash at hard-fork activation heights, plus the four
//!   historical difficulty rules the chain dispatches to (legacy retarget,
//!   EDA, cw-144, aserti3-2d).
//!
//! Everything is a pure function of its explicit inputs plus the read-only
//! [`BlockWindowProvider`] capability supplied by the surrounding engine;
//! no networking, storage, or key handling lives here.
//!
//! ## Addresses
//!
//! ```
//! use bitcoincash_consensus::{AddressType, CashAddressCodec, Network};
//!
//! let codec = CashAddressCodec::new(Network::Mainnet);
//! let address = codec
//!     .decode("bitcoincash:qr6m7j9njldwwzlg9v7v53unlr4jkmx6eylep8ekg2")
//!     .unwrap();
//! assert_eq!(address.kind(), AddressType::PubKeyHash);
//! assert_eq!(address.payload().len(), 20);
//!
//! // The prefix is synthesized when absent and validated either way
//! let bare = codec.decode("qr6m7j9njldwwzlg9v7v53unlr4jkmx6eylep8ekg2").unwrap();
//! assert_eq!(bare, address);
//! ```
//!
//! ## Validator chain
//!
//! ```
//! use std::sync::Arc;
//! use bitcoincash_consensus::{validator_chain, ChainParams, MemoryBlockWindow};
//!
//! let window = Arc::new(MemoryBlockWindow::new());
//! let chain = validator_chain(&ChainParams::mainnet(), window);
//! chain.check_coverage().unwrap();
//! ```

pub mod address;
pub mod asert;
pub mod cashaddr;
pub mod constants;
pub mod daa;
pub mod difficulty;
pub mod eda;
pub mod error;
pub mod legacy;
pub mod network;
pub mod types;
pub mod validators;
pub mod window;

// Re-export commonly used types
pub use address::{CashAddress, CashAddressCodec};
pub use asert::{AsertAnchor, AsertValidator};
pub use constants::*;
pub use daa::DaaValidator;
pub use difficulty::{work_from_target, CompactEncoder, DifficultyEncoder};
pub use eda::EdaValidator;
pub use error::{AddressError, BlockValidationError};
pub use legacy::LegacyDifficultyAdjustmentValidator;
pub use network::{ChainParams, Network};
pub use types::*;
pub use validators::{
    mainnet_validator_set, testnet_validator_set, validator_chain, BlockValidator,
    BlockValidatorChain, BlockValidatorSet, ForkValidator, ProofOfWorkValidator,
};
pub use window::{suitable_block_index, BlockWindowProvider, MemoryBlockWindow};

pub use primitive_types::U256;
