use crate::constants::DEFAULT_MINE_RATE;
use std::time::Duration;

/// Fixed parameters of a [`BlockEngine`](crate::engine::BlockEngine).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Target interval between a block and its successor.
    pub mine_rate: Duration,
}

impl EngineConfig {
    pub fn new(mine_rate: Duration) -> Self {
        Self { mine_rate }
    }

    pub fn from_millis(mine_rate_ms: u64) -> Self {
        Self::new(Duration::from_millis(mine_rate_ms))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MINE_RATE)
    }
}
