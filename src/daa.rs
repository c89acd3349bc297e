//! cw-144 rolling-window difficulty (2017 November rule)
//!
//! The required target follows the chain work accumulated over roughly 144
//! blocks between two median-of-three "suitable" boundary blocks, which
//! keeps a single skewed timestamp from steering the adjustment.

use std::sync::Arc;

use primitive_types::{U256, U512};

use crate::difficulty::{narrow_capped, work_from_target, CompactEncoder, DifficultyEncoder};
use crate::error::BlockValidationError;
use crate::types::{Block, HeightRange};
use crate::validators::BlockValidator;
use crate::window::{suitable_block_index, BlockWindowProvider};

#[derive(Clone)]
pub struct DaaValidator<E = CompactEncoder> {
    encoder: E,
    provider: Arc<dyn BlockWindowProvider>,
    range: HeightRange,
    height_interval: u64,
    target_spacing: u64,
    max_target_bits: u32,
}

impl<E: DifficultyEncoder> DaaValidator<E> {
    pub fn new(
        encoder: E,
        provider: Arc<dyn BlockWindowProvider>,
        range: HeightRange,
        height_interval: u64,
        target_spacing: u64,
        max_target_bits: u32,
    ) -> Self {
        Self {
            encoder,
            provider,
            range,
            height_interval,
            target_spacing,
            max_target_bits,
        }
    }

    fn next_bits(&self, block: &Block, previous: &Block) -> Result<u32, BlockValidationError> {
        // Ancestors covering the parent's three-block suitability window and
        // the one `height_interval` blocks earlier.
        let mut window = self
            .provider
            .previous_window(previous, self.height_interval + 2)
            .ok_or(BlockValidationError::NoPreviousWindow(block.height))?;
        window.push(previous.clone());

        let last_start = window.len() - 3;
        let first_suitable = suitable_block_index(&window[..3])
            .ok_or(BlockValidationError::NoPreviousWindow(block.height))?;
        let last_suitable = last_start
            + suitable_block_index(&window[last_start..])
                .ok_or(BlockValidationError::NoPreviousWindow(block.height))?;

        let first = &window[first_suitable];
        let last = &window[last_suitable];

        let min_timespan = self.height_interval * self.target_spacing / 2;
        let max_timespan = self.height_interval * self.target_spacing * 2;
        let timespan = last
            .timestamp
            .saturating_sub(first.timestamp)
            .clamp(min_timespan, max_timespan);

        let mut work = U256::zero();
        for ancestor in &window[first_suitable + 1..=last_suitable] {
            let target = self.encoder.decode_compact(ancestor.bits);
            work = work.saturating_add(work_from_target(&target));
        }

        let projected = work.full_mul(U256::from(self.target_spacing)) / U512::from(timespan);
        let projected = narrow_capped(projected, U256::MAX);
        if projected.is_zero() {
            return Ok(self.max_target_bits);
        }

        // (2^256 - W) / W, i.e. the target whose expected work is W.
        let complement = (!projected).overflowing_add(U256::one()).0;
        let next_target = complement / projected;

        let limit = self.encoder.decode_compact(self.max_target_bits);
        let capped = if next_target > limit { limit } else { next_target };
        Ok(self.encoder.encode_compact(&capped))
    }
}

impl<E: DifficultyEncoder> BlockValidator for DaaValidator<E> {
    fn height_range(&self) -> HeightRange {
        self.range
    }

    fn validate(&self, block: &Block, previous: &Block) -> Result<(), BlockValidationError> {
        let expected = self.next_bits(block, previous)?;
        if block.bits != expected {
            return Err(BlockValidationError::NotEqualBits {
                expected,
                actual: block.bits,
            });
        }
        Ok(())
    }
}
