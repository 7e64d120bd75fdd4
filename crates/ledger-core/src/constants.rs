use std::time::Duration;

pub const BYTE: usize = 8;
pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const HASH_BITS: u32 = (HASH_SIZE * BYTE) as u32;

/// Target interval between two consecutive blocks.
pub const DEFAULT_MINE_RATE: Duration = Duration::from_secs(4);

pub const GENESIS_TIMESTAMP: u64 = 1;
pub const GENESIS_PREVIOUS_HASH: &str = "genesis_last_hash";
pub const GENESIS_HASH: &str = "genesis_hash";
pub const GENESIS_DIFFICULTY: u32 = 3;
pub const GENESIS_NONCE: &str = "genesis_nonce";
