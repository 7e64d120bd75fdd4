use crate::block::{Block, Nonce};
use crate::cancel::CancelFlag;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::difficulty;
use crate::error::{BlockError, Result};
use crate::pow::meets_difficulty;
use crate::validate;
use serde::Serialize;
use tracing::{debug, info};

/// Builds new blocks on top of a predecessor and checks received ones.
#[derive(Clone, Debug, Default)]
pub struct BlockEngine<C = SystemClock> {
    config: EngineConfig,
    clock: C,
}

impl BlockEngine<SystemClock> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> BlockEngine<C> {
    pub fn with_clock(config: EngineConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Difficulty a successor of `predecessor` stamped at `candidate_timestamp` must meet.
    pub fn adjust_difficulty(&self, predecessor: &Block, candidate_timestamp: u64) -> u32 {
        difficulty::adjust_difficulty(predecessor, candidate_timestamp, self.config.mine_rate)
    }

    /// Search for a block extending `predecessor` that carries `data`.
    ///
    /// Runs until a qualifying hash is found. Fails only if `data` cannot be
    /// serialized.
    pub fn mine<D>(&self, predecessor: &Block, data: &D) -> Result<Block>
    where
        D: Serialize + ?Sized,
    {
        self.mine_cancellable(predecessor, data, &CancelFlag::new())
    }

    /// Like [`mine`](Self::mine), but gives up with [`BlockError::MiningCancelled`]
    /// as soon as `cancel` is raised. The flag is checked before every attempt.
    ///
    /// Timestamp and difficulty are re-sampled on every attempt, so the
    /// difficulty of the returned block reflects the moment the hash was found.
    pub fn mine_cancellable<D>(&self, predecessor: &Block, data: &D, cancel: &CancelFlag) -> Result<Block>
    where
        D: Serialize + ?Sized,
    {
        let data = serde_json::to_value(data)?;
        let previous_hash = predecessor.hash();
        let mut attempts: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                debug!(attempts, previous_hash, "mining cancelled");
                return Err(BlockError::MiningCancelled { attempts });
            }

            let timestamp = self.clock.now_ns();
            let difficulty = self.adjust_difficulty(predecessor, timestamp);
            let nonce = Nonce::Counter(attempts);
            let hash = Block::digest(timestamp, previous_hash, &data, difficulty, &nonce)?;

            if meets_difficulty(&hash, difficulty) {
                info!(
                    nonce = attempts,
                    difficulty,
                    %hash,
                    "Mined block on top of {}",
                    previous_hash
                );
                return Ok(Block::from_parts(
                    timestamp,
                    previous_hash.to_string(),
                    hash,
                    data,
                    difficulty,
                    nonce,
                ));
            }
            attempts = attempts.wrapping_add(1);
        }
    }

    /// See [`validate::validate_successor`].
    pub fn validate_successor(&self, predecessor: &Block, candidate: &Block) -> Result<()> {
        validate::validate_successor(predecessor, candidate)
    }
}
