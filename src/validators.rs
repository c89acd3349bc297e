//! Block validator capability, first-match chain, and fork guard
//!
//! A chain holds validators in fork-precedence order (most specific rule
//! first) and routes every block to the first one whose height range
//! matches. Fork guards are one-shot: they cover exactly the activation
//! height, pin the expected header hash there, and hand the actual
//! difficulty check to the rule they wrap.

use std::sync::Arc;

use primitive_types::U256;

use crate::asert::AsertValidator;
use crate::daa::DaaValidator;
use crate::difficulty::{CompactEncoder, DifficultyEncoder};
use crate::eda::EdaValidator;
use crate::error::BlockValidationError;
use crate::legacy::LegacyDifficultyAdjustmentValidator;
use crate::network::ChainParams;
use crate::types::{Block, ForkActivation, HeightRange};
use crate::window::BlockWindowProvider;

/// A difficulty or format rule over some contiguous span of heights.
///
/// Applicability is data, not behavior: validators report a
/// [`HeightRange`], which lets [`BlockValidatorChain::check_coverage`]
/// verify the partition invariant at assembly time.
pub trait BlockValidator: Send + Sync {
    fn height_range(&self) -> HeightRange;

    fn validate(&self, block: &Block, previous: &Block) -> Result<(), BlockValidationError>;

    fn is_applicable(&self, block: &Block) -> bool {
        self.height_range().contains(block.height)
    }
}

/// Ordered first-match dispatch over registered validators.
///
/// Order encodes fork precedence and is part of the consensus contract:
/// a fork guard shadows the unwrapped rule registered after it at exactly
/// the activation height.
#[derive(Default)]
pub struct BlockValidatorChain {
    validators: Vec<Box<dyn BlockValidator>>,
}

impl BlockValidatorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validator. Registration happens once at startup; there is
    /// no runtime reconfiguration.
    pub fn add<V: BlockValidator + 'static>(&mut self, validator: V) {
        self.validators.push(Box::new(validator));
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Verify the registered ranges jointly cover every height from zero
    /// up. Overlaps are fine (first match wins); a gap means some block
    /// could hit `NoApplicableRule` at runtime, which is a configuration
    /// defect, so surface it at assembly time.
    pub fn check_coverage(&self) -> Result<(), BlockValidationError> {
        let mut ranges: Vec<HeightRange> = self
            .validators
            .iter()
            .map(|validator| validator.height_range())
            .collect();
        ranges.sort_by_key(|range| range.start());

        let mut covered_to: u64 = 0;
        for range in &ranges {
            if range.start() > covered_to {
                return Err(BlockValidationError::NoApplicableRule(covered_to));
            }
            match range.end() {
                None => return Ok(()),
                Some(end) => covered_to = covered_to.max(end),
            }
        }
        Err(BlockValidationError::NoApplicableRule(covered_to))
    }
}

impl BlockValidator for BlockValidatorChain {
    fn height_range(&self) -> HeightRange {
        let mut start = u64::MAX;
        let mut end: u64 = 0;
        let mut unbounded = false;
        for validator in &self.validators {
            let range = validator.height_range();
            start = start.min(range.start());
            match range.end() {
                None => unbounded = true,
                Some(e) => end = end.max(e),
            }
        }
        if self.validators.is_empty() {
            HeightRange::bounded(0, 0)
        } else if unbounded {
            HeightRange::from_height(start)
        } else {
            HeightRange::bounded(start, end)
        }
    }

    fn validate(&self, block: &Block, previous: &Block) -> Result<(), BlockValidationError> {
        for validator in &self.validators {
            if validator.is_applicable(block) {
                return validator.validate(block, previous);
            }
        }
        Err(BlockValidationError::NoApplicableRule(block.height))
    }
}

/// Conjunction of validators: every applicable member must accept.
///
/// The usual arrangement is a stateless proof-of-work format check plus a
/// [`BlockValidatorChain`] of difficulty rules.
#[derive(Default)]
pub struct BlockValidatorSet {
    validators: Vec<Box<dyn BlockValidator>>,
}

impl BlockValidatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<V: BlockValidator + 'static>(&mut self, validator: V) {
        self.validators.push(Box::new(validator));
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn validate(&self, block: &Block, previous: &Block) -> Result<(), BlockValidationError> {
        for validator in &self.validators {
            if validator.is_applicable(block) {
                validator.validate(block, previous)?;
            }
        }
        Ok(())
    }
}

/// One-shot hash pin at a hard-fork activation height.
///
/// The difficulty math alone cannot tell two forks apart at the seam; the
/// pinned hash catches a chain that diverged the wrong way before any
/// window arithmetic runs. Every block after the activation is handled by
/// the unwrapped inner rule registered after this guard.
#[derive(Debug, Clone)]
pub struct ForkValidator<V> {
    inner: V,
    activation: ForkActivation,
}

impl<V: BlockValidator> ForkValidator<V> {
    pub fn new(inner: V, activation: ForkActivation) -> Self {
        Self { inner, activation }
    }
}

impl<V: BlockValidator> BlockValidator for ForkValidator<V> {
    fn height_range(&self) -> HeightRange {
        HeightRange::at(self.activation.height)
    }

    fn validate(&self, block: &Block, previous: &Block) -> Result<(), BlockValidationError> {
        if block.header_hash != self.activation.expected_header_hash {
            return Err(BlockValidationError::WrongHeaderHash {
                height: block.height,
            });
        }
        self.inner.validate(block, previous)
    }
}

/// Stateless proof-of-work format check: the bits must encode a sane
/// target and the header hash must meet it.
#[derive(Debug, Clone, Copy)]
pub struct ProofOfWorkValidator<E = CompactEncoder> {
    encoder: E,
    max_target_bits: u32,
}

impl<E: DifficultyEncoder> ProofOfWorkValidator<E> {
    pub fn new(encoder: E, max_target_bits: u32) -> Self {
        Self {
            encoder,
            max_target_bits,
        }
    }
}

impl<E: DifficultyEncoder> BlockValidator for ProofOfWorkValidator<E> {
    fn height_range(&self) -> HeightRange {
        HeightRange::from_height(0)
    }

    fn validate(&self, block: &Block, _previous: &Block) -> Result<(), BlockValidationError> {
        let target = self.encoder.decode_compact(block.bits);
        let limit = self.encoder.decode_compact(self.max_target_bits);
        if target.is_zero() || target > limit {
            return Err(BlockValidationError::InvalidProofOfWork);
        }
        if U256::from_little_endian(&block.header_hash) > target {
            return Err(BlockValidationError::InvalidProofOfWork);
        }
        Ok(())
    }
}

/// Difficulty-rule chain in fork-precedence order, per the given
/// parameters: guard(ASERT) at the newest split, ASERT, guard(DAA) at the
/// older split, DAA, then the legacy and EDA eras.
pub fn validator_chain(
    params: &ChainParams,
    provider: Arc<dyn BlockWindowProvider>,
) -> BlockValidatorChain {
    let encoder = CompactEncoder;

    let asert = AsertValidator::new(
        encoder,
        params.asert_anchor,
        HeightRange::from_height(params.bchn_fork.height),
        params.target_spacing,
        params.asert_half_life,
        params.max_target_bits,
    );
    let daa = DaaValidator::new(
        encoder,
        Arc::clone(&provider),
        HeightRange::bounded(params.daa_fork_height, params.bchn_fork.height),
        params.daa_height_interval,
        params.target_spacing,
        params.max_target_bits,
    );
    let legacy = LegacyDifficultyAdjustmentValidator::new(
        encoder,
        Arc::clone(&provider),
        HeightRange::bounded(0, params.eda_fork_height),
        params.legacy_height_interval,
        params.legacy_height_interval * params.target_spacing,
        params.max_target_bits,
    );
    let eda = EdaValidator::new(
        encoder,
        Arc::clone(&provider),
        HeightRange::bounded(params.eda_fork_height, params.daa_fork_height),
        params.legacy_height_interval,
        params.legacy_height_interval * params.target_spacing,
        params.max_target_bits,
    );

    let mut chain = BlockValidatorChain::new();
    chain.add(ForkValidator::new(asert.clone(), params.bchn_fork));
    chain.add(asert);
    chain.add(ForkValidator::new(daa.clone(), params.sv_fork));
    chain.add(daa);
    chain.add(legacy);
    chain.add(eda);
    chain
}

/// Main-network validator set: proof-of-work format check plus the full
/// difficulty-rule chain.
pub fn mainnet_validator_set(provider: Arc<dyn BlockWindowProvider>) -> BlockValidatorSet {
    let mut set = BlockValidatorSet::new();
    set.add(ProofOfWorkValidator::new(CompactEncoder, crate::constants::MAX_TARGET_BITS));
    set.add(validator_chain(&ChainParams::mainnet(), provider));
    set
}

/// Test-network validator set: the proof-of-work format check only, no
/// difficulty rules.
pub fn testnet_validator_set() -> BlockValidatorSet {
    let mut set = BlockValidatorSet::new();
    set.add(ProofOfWorkValidator::new(CompactEncoder, crate::constants::MAX_TARGET_BITS));
    set
}
