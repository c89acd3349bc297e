//! Error types for address conversion and block validation

use thiserror::Error;

/// Address conversion failures. Every variant is terminal for the call:
/// the input is not a valid cash address for the configured network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address checksum does not verify")]
    InvalidChecksum,

    #[error("address prefix '{found}' does not match network prefix '{expected}'")]
    WrongPrefix { expected: String, found: String },

    #[error("payload length {0} is not a valid cash address size")]
    InvalidLength(usize),

    #[error("script type has no cash address representation")]
    UnsupportedScriptType,

    #[error("not a parseable cash address")]
    UnknownAddressType,
}

/// Block validation failures raised by the validator chain and the
/// difficulty rules it dispatches to.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockValidationError {
    #[error("header hash at fork height {height} does not match the pinned fork block")]
    WrongHeaderHash { height: u64 },

    #[error("no validator covers height {0}")]
    NoApplicableRule(u64),

    #[error("block bits {actual:#010x} do not match required bits {expected:#010x}")]
    NotEqualBits { expected: u32, actual: u32 },

    #[error("header hash does not satisfy the target encoded in bits")]
    InvalidProofOfWork,

    #[error("not enough stored blocks to evaluate the rule for height {0}")]
    NoPreviousWindow(u64),
}
