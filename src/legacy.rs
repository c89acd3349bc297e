//! Legacy difficulty rule: Bitcoin's 2016-block retarget
//!
//! Between retarget boundaries the compact bits must not change; at a
//! boundary they are recomputed from the elapsed time of the finished
//! period, clamped to a quarter and four times the two-week schedule.

use std::sync::Arc;

use primitive_types::U256;

use crate::difficulty::{CompactEncoder, DifficultyEncoder};
use crate::error::BlockValidationError;
use crate::types::{Block, HeightRange};
use crate::validators::BlockValidator;
use crate::window::BlockWindowProvider;

#[derive(Clone)]
pub struct LegacyDifficultyAdjustmentValidator<E = CompactEncoder> {
    encoder: E,
    provider: Arc<dyn BlockWindowProvider>,
    range: HeightRange,
    height_interval: u64,
    target_timespan: u64,
    max_target_bits: u32,
}

impl<E: DifficultyEncoder> LegacyDifficultyAdjustmentValidator<E> {
    pub fn new(
        encoder: E,
        provider: Arc<dyn BlockWindowProvider>,
        range: HeightRange,
        height_interval: u64,
        target_timespan: u64,
        max_target_bits: u32,
    ) -> Self {
        Self {
            encoder,
            provider,
            range,
            height_interval,
            target_timespan,
            max_target_bits,
        }
    }
}

impl<E: DifficultyEncoder> BlockValidator for LegacyDifficultyAdjustmentValidator<E> {
    fn height_range(&self) -> HeightRange {
        self.range
    }

    fn validate(&self, block: &Block, previous: &Block) -> Result<(), BlockValidationError> {
        if block.height % self.height_interval == 0 {
            let expected = next_work_required(
                &self.encoder,
                self.provider.as_ref(),
                block,
                previous,
                self.height_interval,
                self.target_timespan,
                self.max_target_bits,
            )?;
            if block.bits != expected {
                return Err(BlockValidationError::NotEqualBits {
                    expected,
                    actual: block.bits,
                });
            }
        } else if block.bits != previous.bits {
            return Err(BlockValidationError::NotEqualBits {
                expected: previous.bits,
                actual: block.bits,
            });
        }
        Ok(())
    }
}

/// Recompute the required bits at a retarget boundary.
///
/// Shared with [`crate::eda::EdaValidator`], whose era still retargets on
/// the legacy schedule at period boundaries.
pub(crate) fn next_work_required<E: DifficultyEncoder>(
    encoder: &E,
    provider: &dyn BlockWindowProvider,
    block: &Block,
    previous: &Block,
    height_interval: u64,
    target_timespan: u64,
    max_target_bits: u32,
) -> Result<u32, BlockValidationError> {
    let first = provider
        .previous(previous, height_interval - 1)
        .ok_or(BlockValidationError::NoPreviousWindow(block.height))?;

    let timespan = previous
        .timestamp
        .saturating_sub(first.timestamp)
        .clamp(target_timespan / 4, target_timespan * 4);

    let limit = encoder.decode_compact(max_target_bits);
    let adjusted = encoder
        .decode_compact(previous.bits)
        .checked_mul(U256::from(timespan))
        .map(|scaled| scaled / U256::from(target_timespan))
        .unwrap_or(limit);
    let capped = if adjusted > limit { limit } else { adjusted };
    Ok(encoder.encode_compact(&capped))
}
