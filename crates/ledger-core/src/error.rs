use thiserror::Error;

/// Everything that can go wrong while building, mining or checking a block.
///
/// The four validation variants are reported in the order
/// [`validate_successor`](crate::validate::validate_successor) checks them.
#[derive(Debug, Error)]
pub enum BlockError {
    #[error("malformed block: {0}")]
    MalformedBlock(String),

    #[error("the block previous hash must be correct (expected {expected}, found {found})")]
    BrokenChainLink { expected: String, found: String },

    #[error("the proof of work requirement was not met ({leading_zeros} leading zero bits, {difficulty} required)")]
    ProofOfWorkNotMet { difficulty: u32, leading_zeros: u32 },

    #[error("the block difficulty must only adjust by 1 (from {previous} to {candidate})")]
    DifficultyJumpTooLarge { previous: u32, candidate: u32 },

    #[error("the block hash must be correct (expected {expected}, found {found})")]
    HashMismatch { expected: String, found: String },

    #[error("failed to serialize hash input: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("mining cancelled after {attempts} attempts")]
    MiningCancelled { attempts: u64 },
}

impl BlockError {
    /// Stable tag for logs and API responses.
    pub fn reason(&self) -> &'static str {
        match self {
            BlockError::MalformedBlock(_) => "malformed_block",
            BlockError::BrokenChainLink { .. } => "broken_chain_link",
            BlockError::ProofOfWorkNotMet { .. } => "proof_of_work_not_met",
            BlockError::DifficultyJumpTooLarge { .. } => "difficulty_jump_too_large",
            BlockError::HashMismatch { .. } => "hash_mismatch",
            BlockError::Serialization(_) => "serialization_error",
            BlockError::MiningCancelled { .. } => "mining_cancelled",
        }
    }

    /// True for the rejections produced by successor validation.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            BlockError::BrokenChainLink { .. }
                | BlockError::ProofOfWorkNotMet { .. }
                | BlockError::DifficultyJumpTooLarge { .. }
                | BlockError::HashMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BlockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_are_distinct() {
        let errors = [
            BlockError::MalformedBlock("x".into()),
            BlockError::BrokenChainLink {
                expected: "a".into(),
                found: "b".into(),
            },
            BlockError::ProofOfWorkNotMet {
                difficulty: 3,
                leading_zeros: 1,
            },
            BlockError::DifficultyJumpTooLarge {
                previous: 3,
                candidate: 5,
            },
            BlockError::HashMismatch {
                expected: "a".into(),
                found: "b".into(),
            },
            BlockError::MiningCancelled { attempts: 7 },
        ];
        let mut reasons: Vec<_> = errors.iter().map(BlockError::reason).collect();
        reasons.sort_unstable();
        reasons.dedup();
        assert_eq!(reasons.len(), errors.len());
    }

    #[test]
    fn only_successor_checks_count_as_validation_failures() {
        assert!(BlockError::HashMismatch {
            expected: "a".into(),
            found: "b".into()
        }
        .is_validation_failure());
        assert!(!BlockError::MalformedBlock("missing field".into()).is_validation_failure());
        assert!(!BlockError::MiningCancelled { attempts: 0 }.is_validation_failure());
    }

    #[test]
    fn display_names_the_offending_values() {
        let err = BlockError::DifficultyJumpTooLarge {
            previous: 3,
            candidate: 6,
        };
        assert_eq!(
            err.to_string(),
            "the block difficulty must only adjust by 1 (from 3 to 6)"
        );
    }
}
