//! Rules a block must satisfy to extend a given predecessor.

use crate::block::Block;
use crate::error::{BlockError, Result};
use crate::pow::leading_zero_bits;
use tracing::debug;

/// Check that `candidate` legally extends `predecessor`.
///
/// The rules are applied in a fixed order and the first failure is returned:
/// - the candidate links to the predecessor's hash,
/// - its hash carries `difficulty` leading zero bits,
/// - its difficulty is within one of the predecessor's,
/// - its hash is the digest of its own fields.
pub fn validate_successor(predecessor: &Block, candidate: &Block) -> Result<()> {
    check(predecessor, candidate).inspect_err(|e| {
        debug!(reason = e.reason(), candidate = candidate.hash(), "rejected block: {e}");
    })
}

fn check(predecessor: &Block, candidate: &Block) -> Result<()> {
    if candidate.previous_hash() != predecessor.hash() {
        return Err(BlockError::BrokenChainLink {
            expected: predecessor.hash().to_string(),
            found: candidate.previous_hash().to_string(),
        });
    }

    let leading_zeros = leading_zero_bits(candidate.hash());
    if leading_zeros < candidate.difficulty() {
        return Err(BlockError::ProofOfWorkNotMet {
            difficulty: candidate.difficulty(),
            leading_zeros,
        });
    }

    if predecessor.difficulty().abs_diff(candidate.difficulty()) > 1 {
        return Err(BlockError::DifficultyJumpTooLarge {
            previous: predecessor.difficulty(),
            candidate: candidate.difficulty(),
        });
    }

    let recomputed = candidate.recompute_hash()?;
    if recomputed != candidate.hash() {
        return Err(BlockError::HashMismatch {
            expected: recomputed,
            found: candidate.hash().to_string(),
        });
    }

    Ok(())
}
