//! aserti3-2d absolute exponential difficulty (2020 November rule)
//!
//! The required target is the anchor target scaled by 2^(drift / half-life),
//! where drift is how far the parent's timestamp has moved from the ideal
//! schedule counted from a fixed anchor block. The fractional part of the
//! exponent uses the reference cubic fixed-point approximation, so every
//! implementation lands on identical bits.

use serde::{Deserialize, Serialize};

use primitive_types::U256;

use crate::difficulty::{narrow_capped, CompactEncoder, DifficultyEncoder};
use crate::error::BlockValidationError;
use crate::types::{Block, HeightRange};
use crate::validators::BlockValidator;

/// Fixed reference point for the exponential schedule: the activation
/// block's height and bits plus its parent's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsertAnchor {
    pub height: u64,
    pub bits: u32,
    pub parent_timestamp: u64,
}

#[derive(Clone)]
pub struct AsertValidator<E = CompactEncoder> {
    encoder: E,
    anchor: AsertAnchor,
    range: HeightRange,
    target_spacing: u64,
    half_life: i64,
    max_target_bits: u32,
}

impl<E: DifficultyEncoder> AsertValidator<E> {
    pub fn new(
        encoder: E,
        anchor: AsertAnchor,
        range: HeightRange,
        target_spacing: u64,
        half_life: i64,
        max_target_bits: u32,
    ) -> Self {
        Self {
            encoder,
            anchor,
            range,
            target_spacing,
            half_life,
            max_target_bits,
        }
    }

    fn next_bits(&self, block: &Block, previous: &Block) -> Result<u32, BlockValidationError> {
        let height_diff = previous
            .height
            .checked_sub(self.anchor.height)
            .ok_or(BlockValidationError::NoPreviousWindow(block.height))?;
        let time_diff = previous.timestamp as i64 - self.anchor.parent_timestamp as i64;
        let ideal = self.target_spacing as i64 * (height_diff as i64 + 1);

        // Exponent in 16.16 fixed point; truncating division matches the
        // reference implementation.
        let exponent = ((i128::from(time_diff) - i128::from(ideal)) * 65536
            / i128::from(self.half_life)) as i64;
        let mut shifts = exponent >> 16;
        let frac = (exponent & 0xffff) as u128;

        // 2^(frac/65536) in 16.16 fixed point, cubic approximation from the
        // aserti3-2d specification.
        let factor = 65536u64
            + ((195_766_423_245_049u128 * frac
                + 971_821_376u128 * frac * frac
                + 5_127u128 * frac * frac * frac
                + (1u128 << 47))
                >> 48) as u64;

        let anchor_target = self.encoder.decode_compact(self.anchor.bits);
        let limit = self.encoder.decode_compact(self.max_target_bits);
        let mut next = anchor_target.full_mul(U256::from(factor));

        shifts -= 16;
        if shifts < 0 {
            next = next >> ((-shifts) as u64 as usize);
        } else {
            let shifts = shifts as usize;
            if shifts >= 512 || next.bits() + shifts > 512 {
                return Ok(self.max_target_bits);
            }
            next = next << shifts;
        }

        if next.is_zero() {
            return Ok(self.encoder.encode_compact(&U256::one()));
        }
        let capped = narrow_capped(next, limit);
        Ok(self.encoder.encode_compact(&capped))
    }
}

impl<E: DifficultyEncoder> BlockValidator for AsertValidator<E> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ASERT_HALF_LIFE, MAX_TARGET_BITS, TARGET_SPACING};

    const ANCHOR_BITS: u32 = 0x1b0404cb;

    fn anchor() -> AsertAnchor {
        AsertAnchor {
            height: 1000,
            bits: ANCHOR_BITS,
            parent_timestamp: 200_000,
        }
    }

    fn validator() -> AsertValidator {
        AsertValidator::new(
            CompactEncoder,
            anchor(),
            HeightRange::from_height(1000),
            TARGET_SPACING,
            ASERT_HALF_LIFE,
            MAX_TARGET_BITS,
        )
    }

    fn block(height: u64, timestamp: u64, bits: u32) -> Block {
        Block {
            height,
            timestamp,
            header_hash: [0; 32],
            prev_hash: [0; 32],
            bits,
        }
    }

    /// Parent timestamp exactly on schedule for its height.
    fn on_schedule(height: u64) -> Block {
        let elapsed = TARGET_SPACING * (height - 1000 + 1);
        block(height, 200_000 + elapsed, ANCHOR_BITS)
    }

    #[test]
    fn test_on_schedule_keeps_anchor_bits() {
        let previous = on_schedule(1049);
        let candidate = block(1050, previous.timestamp + TARGET_SPACING, ANCHOR_BITS);
        validator().validate(&candidate, &previous).unwrap();
    }

    #[test]
    fn test_anchor_block_itself_is_on_schedule() {
        let previous = on_schedule(1000);
        let candidate = block(1001, previous.timestamp + TARGET_SPACING, ANCHOR_BITS);
        validator().validate(&candidate, &previous).unwrap();
    }

    #[test]
    fn test_one_half_life_late_doubles_target() {
        let mut previous = on_schedule(1049);
        previous.timestamp += ASERT_HALF_LIFE as u64;
        // 0x0404cb doubled is 0x080996 with one more significant byte
        let candidate = block(1050, previous.timestamp + TARGET_SPACING, 0x1b080996);
        validator().validate(&candidate, &previous).unwrap();
    }

    #[test]
    fn test_one_half_life_early_halves_target() {
        let mut previous = on_schedule(1049);
        previous.timestamp -= ASERT_HALF_LIFE as u64;
        let candidate = block(1050, previous.timestamp + TARGET_SPACING, 0x1b020265);
        validator().validate(&candidate, &previous).unwrap();
    }

    #[test]
    fn test_far_behind_schedule_caps_at_pow_limit() {
        let mut previous = on_schedule(1049);
        // Forty half-lives of stall: 2^40 above the anchor target clears
        // the pow limit by a wide margin.
        previous.timestamp += 40 * ASERT_HALF_LIFE as u64;
        let candidate = block(1050, previous.timestamp + TARGET_SPACING, MAX_TARGET_BITS);
        validator().validate(&candidate, &previous).unwrap();
    }

    #[test]
    fn test_wrong_bits_rejected() {
        let previous = on_schedule(1049);
        let candidate = block(1050, previous.timestamp + TARGET_SPACING, MAX_TARGET_BITS);
        assert_eq!(
            validator().validate(&candidate, &previous),
            Err(BlockValidationError::NotEqualBits {
                expected: ANCHOR_BITS,
                actual: MAX_TARGET_BITS,
            })
        );
    }

    #[test]
    fn test_parent_below_anchor_fails() {
        let previous = block(999, 200_000, ANCHOR_BITS);
        let candidate = block(1000, 200_600, ANCHOR_BITS);
        assert_eq!(
            validator().validate(&candidate, &previous),
            Err(BlockValidationError::NoPreviousWindow(1000))
        );
    }
}
