//! Historical block window capability and median helpers
//!
//! Difficulty rules never walk the chain themselves; they ask an externally
//! supplied [`BlockWindowProvider`] for fixed-size windows of ancestors, so
//! every validation stays a pure function of explicit inputs plus one
//! read-only snapshot.

use std::collections::BTreeMap;

use crate::constants::MEDIAN_TIME_SPAN;
use crate::types::Block;

/// Lookup capability over consecutive ancestor blocks on the active chain.
///
/// Implementations must reflect a consistent chain snapshot for the
/// duration of one `validate` call; the engine owns all locking.
pub trait BlockWindowProvider: Send + Sync {
    /// The ancestor `count` blocks before `block`, or `None` if unavailable
    /// (near genesis or past a pruned horizon).
    fn previous(&self, block: &Block, count: u64) -> Option<Block>;

    /// The `count` blocks immediately preceding `block` in ascending height
    /// order, or `None` when fewer are available.
    fn previous_window(&self, block: &Block, count: u64) -> Option<Vec<Block>>;

    /// Median timestamp over the trailing [`MEDIAN_TIME_SPAN`] blocks ending
    /// at `block`, or `None` when the window is incomplete.
    fn median_time_past(&self, block: &Block) -> Option<u64>;
}

/// Index of the median-timestamp block among exactly three candidates.
///
/// This three-block median is a consensus rule, not a general statistic: it
/// selects a representative timestamp robust to one skewed or hostile block
/// time. Any input length other than three yields `None`.
pub fn suitable_block_index(blocks: &[Block]) -> Option<usize> {
    if blocks.len() != 3 {
        return None;
    }
    let mut order = [0usize, 1, 2];
    order.sort_by_key(|&i| blocks[i].timestamp);
    Some(order[1])
}

/// Height-indexed in-memory window, for tests and engines without storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlockWindow {
    blocks: BTreeMap<u64, Block>,
}

impl MemoryBlockWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let mut window = Self::new();
        for block in blocks {
            window.insert(block);
        }
        window
    }

    /// Insert or replace the block stored at its height.
    pub fn insert(&mut self, block: Block) {
        self.blocks.insert(block.height, block);
    }

    pub fn get(&self, height: u64) -> Option<&Block> {
        self.blocks.get(&height)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl BlockWindowProvider for MemoryBlockWindow {
    fn previous(&self, block: &Block, count: u64) -> Option<Block> {
        let height = block.height.checked_sub(count)?;
        self.blocks.get(&height).cloned()
    }

    fn previous_window(&self, block: &Block, count: u64) -> Option<Vec<Block>> {
        let first = block.height.checked_sub(count)?;
        let mut window = Vec::with_capacity(count as usize);
        for height in first..block.height {
            window.push(self.blocks.get(&height)?.clone());
        }
        Some(window)
    }

    fn median_time_past(&self, block: &Block) -> Option<u64> {
        let mut timestamps = Vec::with_capacity(MEDIAN_TIME_SPAN);
        timestamps.push(block.timestamp);
        for offset in 1..MEDIAN_TIME_SPAN as u64 {
            let height = block.height.checked_sub(offset)?;
            timestamps.push(self.blocks.get(&height)?.timestamp);
        }
        timestamps.sort_unstable();
        Some(timestamps[MEDIAN_TIME_SPAN / 2])
    }
}
