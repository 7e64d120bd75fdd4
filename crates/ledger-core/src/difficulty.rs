//! Single-step difficulty retargeting.

use crate::block::Block;
use std::time::Duration;

/// Difficulty for a block extending `predecessor` and stamped at `candidate_timestamp`.
///
/// A block arriving sooner than `mine_rate` after its predecessor raises the
/// difficulty by one; otherwise it drops by one, never below 1. A candidate
/// stamped before its predecessor counts as fast.
pub fn adjust_difficulty(predecessor: &Block, candidate_timestamp: u64, mine_rate: Duration) -> u32 {
    let elapsed = candidate_timestamp.saturating_sub(predecessor.timestamp());
    if u128::from(elapsed) < mine_rate.as_nanos() {
        return predecessor.difficulty().saturating_add(1);
    }
    predecessor.difficulty().saturating_sub(1).max(1)
}
