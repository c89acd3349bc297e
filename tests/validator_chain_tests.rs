//! Integration tests for the fork-aware validator chain

use std::sync::Arc;

use bitcoincash_consensus::{
    mainnet_validator_set, testnet_validator_set, validator_chain, AsertAnchor, AsertValidator,
    Block, BlockValidationError, BlockValidator, BlockValidatorChain, ChainParams, CompactEncoder,
    ForkActivation, ForkValidator, HeightRange, MemoryBlockWindow, ASERT_HALF_LIFE,
    MAX_TARGET_BITS, TARGET_SPACING,
};

fn block(height: u64, timestamp: u64, bits: u32) -> Block {
    Block {
        height,
        timestamp,
        header_hash: [height as u8; 32],
        prev_hash: [0; 32],
        bits,
    }
}

/// ASERT rule over a synthetic anchor, the building block for fork tests.
fn asert(anchor_height: u64, anchor_timestamp: u64) -> AsertValidator {
    AsertValidator::new(
        CompactEncoder,
        AsertAnchor {
            height: anchor_height,
            bits: MAX_TARGET_BITS,
            parent_timestamp: anchor_timestamp,
        },
        HeightRange::from_height(anchor_height + 1),
        TARGET_SPACING,
        ASERT_HALF_LIFE,
        MAX_TARGET_BITS,
    )
}

#[test]
fn test_mainnet_chain_covers_every_height() {
    let provider = Arc::new(MemoryBlockWindow::new());
    let chain = validator_chain(&ChainParams::mainnet(), provider);
    assert_eq!(chain.len(), 6);
    chain.check_coverage().unwrap();
}

#[test]
fn test_mainnet_set_assembles() {
    let provider = Arc::new(MemoryBlockWindow::new());
    let set = mainnet_validator_set(provider);
    assert_eq!(set.len(), 2);
}

#[test]
fn test_testnet_set_is_pow_only() {
    let set = testnet_validator_set();
    assert_eq!(set.len(), 1);
    // No difficulty rules: a steady-bits block with a light hash passes at
    // any height
    let previous = block(700_000, 1000, MAX_TARGET_BITS);
    let mut candidate = block(700_001, 1600, MAX_TARGET_BITS);
    candidate.header_hash = [0; 32];
    set.validate(&candidate, &previous).unwrap();
}

#[test]
fn test_fork_guard_rejects_wrong_branch_regardless_of_difficulty() {
    // Synthetic fork at height 2001: the difficulty math below would accept
    // the block, only the hash pin fails.
    let fork_height = 2001;
    let anchor_timestamp = 1_000_000;
    let rule = asert(2000, anchor_timestamp);

    let mut guard_chain = BlockValidatorChain::new();
    guard_chain.add(ForkValidator::new(
        rule.clone(),
        ForkActivation {
            height: fork_height,
            expected_header_hash: [0x77; 32],
        },
    ));
    guard_chain.add(rule);

    let previous = block(2000, anchor_timestamp + TARGET_SPACING, MAX_TARGET_BITS);

    // On-schedule candidate with the wrong header hash
    let mut candidate = block(
        fork_height,
        anchor_timestamp + 2 * TARGET_SPACING,
        MAX_TARGET_BITS,
    );
    assert_eq!(
        guard_chain.validate(&candidate, &previous),
        Err(BlockValidationError::WrongHeaderHash { height: fork_height })
    );

    // Same block on the pinned branch delegates to the wrapped rule
    candidate.header_hash = [0x77; 32];
    guard_chain.validate(&candidate, &previous).unwrap();

    // One block later the guard no longer applies and the bare rule runs
    let next = block(
        fork_height + 1,
        anchor_timestamp + 3 * TARGET_SPACING,
        MAX_TARGET_BITS,
    );
    guard_chain
        .validate(&next, &candidate)
        .unwrap();
}

#[test]
fn test_guard_applies_to_exactly_one_height() {
    let rule = asert(99, 500_000);
    let guard = ForkValidator::new(
        rule,
        ForkActivation {
            height: 100,
            expected_header_hash: [0x11; 32],
        },
    );
    assert_eq!(guard.height_range(), HeightRange::at(100));
    assert!(guard.is_applicable(&block(100, 0, MAX_TARGET_BITS)));
    assert!(!guard.is_applicable(&block(99, 0, MAX_TARGET_BITS)));
    assert!(!guard.is_applicable(&block(101, 0, MAX_TARGET_BITS)));
}

#[test]
fn test_chain_reports_gap_in_synthetic_configuration() {
    let mut chain = BlockValidatorChain::new();
    // Forgot everything below the anchor
    chain.add(asert(1000, 1_000_000));
    assert_eq!(
        chain.check_coverage(),
        Err(BlockValidationError::NoApplicableRule(0))
    );
}

#[test]
fn test_validation_error_propagates_unchanged_through_chain() {
    let mut chain = BlockValidatorChain::new();
    let rule = asert(0, 1_000_000);
    chain.add(rule);

    let previous = block(1, 1_000_000 + 2 * TARGET_SPACING, MAX_TARGET_BITS);
    // Off-schedule bits: the inner rule's NotEqualBits arrives verbatim
    let candidate = block(2, 1_000_000 + 3 * TARGET_SPACING, 0x1b0404cb);
    match chain.validate(&candidate, &previous) {
        Err(BlockValidationError::NotEqualBits { actual, .. }) => {
            assert_eq!(actual, 0x1b0404cb);
        }
        other => panic!("expected NotEqualBits, got {other:?}"),
    }
}

#[test]
fn test_chain_dispatch_is_deterministic_at_boundaries() {
    // Ranges [0, 1000), [1000, 2000), [2000, ..) built from synthetic
    // ASERT rules; the anchors differ so the failure modes reveal which
    // rule ran at each boundary height.
    let early = AsertValidator::new(
        CompactEncoder,
        AsertAnchor { height: 0, bits: MAX_TARGET_BITS, parent_timestamp: 0 },
        HeightRange::bounded(0, 1000),
        TARGET_SPACING,
        ASERT_HALF_LIFE,
        MAX_TARGET_BITS,
    );
    let middle = AsertValidator::new(
        CompactEncoder,
        AsertAnchor { height: 1000, bits: MAX_TARGET_BITS, parent_timestamp: 600_000 },
        HeightRange::bounded(1000, 2000),
        TARGET_SPACING,
        ASERT_HALF_LIFE,
        MAX_TARGET_BITS,
    );
    let late = AsertValidator::new(
        CompactEncoder,
        AsertAnchor { height: 2000, bits: MAX_TARGET_BITS, parent_timestamp: 1_200_000 },
        HeightRange::from_height(2000),
        TARGET_SPACING,
        ASERT_HALF_LIFE,
        MAX_TARGET_BITS,
    );

    let mut chain = BlockValidatorChain::new();
    chain.add(early);
    chain.add(middle);
    chain.add(late);
    chain.check_coverage().unwrap();

    // The middle rule owns height 1000: a parent below its anchor makes it
    // fail with NoPreviousWindow, which the early rule never would.
    let previous = block(999, 599_400, MAX_TARGET_BITS);
    let candidate = block(1000, 600_000, MAX_TARGET_BITS);
    assert_eq!(
        chain.validate(&candidate, &previous),
        Err(BlockValidationError::NoPreviousWindow(1000))
    );

    // Height 999 still belongs to the early rule and validates on schedule.
    let previous = block(998, TARGET_SPACING * 999, MAX_TARGET_BITS);
    let candidate = block(999, TARGET_SPACING * 1000, MAX_TARGET_BITS);
    chain.validate(&candidate, &previous).unwrap();
}
