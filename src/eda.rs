//! Emergency difficulty adjustment (2017 August - November rule)
//!
//! Outside retarget boundaries the bits normally carry over unchanged, but
//! when the chain stalls - the median-time-past gap between the parent and
//! its sixth ancestor reaching twelve hours - the target may relax by a
//! quarter, capped at the pow limit.

use std::sync::Arc;

use crate::constants::EDA_RELAX_GAP;
use crate::difficulty::{CompactEncoder, DifficultyEncoder};
use crate::error::BlockValidationError;
use crate::legacy::next_work_required;
use crate::types::{Block, HeightRange};
use crate::validators::BlockValidator;
use crate::window::BlockWindowProvider;

#[derive(Clone)]
pub struct EdaValidator<E = CompactEncoder> {
    encoder: E,
    provider: Arc<dyn BlockWindowProvider>,
    range: HeightRange,
    height_interval: u64,
    target_timespan: u64,
    max_target_bits: u32,
}

impl<E: DifficultyEncoder> EdaValidator<E> {
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

    fn require_bits(&self, expected: u32, block: &Block) -> Result<(), BlockValidationError> {
        if block.bits != expected {
            return Err(BlockValidationError::NotEqualBits {
                expected,
                actual: block.bits,
            });
        }
        Ok(())
    }
}

impl<E: DifficultyEncoder> BlockValidator for EdaValidator<E> {
    fn height_range(&self) -> HeightRange {
        self.range
    }

    fn validate(&self, block: &Block, previous: &Block) -> Result<(), BlockValidationError> {
        // The legacy retarget schedule keeps running through the EDA era.
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
            return self.require_bits(expected, block);
        }

        // Already at the pow limit: nothing to relax.
        if previous.bits == self.max_target_bits {
            return self.require_bits(self.max_target_bits, block);
        }

        let sixth_ancestor = self
            .provider
            .previous(previous, 6)
            .ok_or(BlockValidationError::NoPreviousWindow(block.height))?;
        let mtp_tip = self
            .provider
            .median_time_past(previous)
            .ok_or(BlockValidationError::NoPreviousWindow(block.height))?;
        let mtp_sixth = self
            .provider
            .median_time_past(&sixth_ancestor)
            .ok_or(BlockValidationError::NoPreviousWindow(block.height))?;

        if mtp_tip.saturating_sub(mtp_sixth) >= EDA_RELAX_GAP {
            let limit = self.encoder.decode_compact(self.max_target_bits);
            let target = self.encoder.decode_compact(previous.bits);
            let relaxed = target.checked_add(target >> 2usize).unwrap_or(limit);
            let capped = if relaxed > limit { limit } else { relaxed };
            self.require_bits(self.encoder.encode_compact(&capped), block)
        } else {
            self.require_bits(previous.bits, block)
        }
    }
}
