//! Block construction, proof-of-work mining and successor validation for an
//! append-only, hash-linked ledger.
//!
//! The crate is self-contained: callers hold the chain, hand the engine a
//! predecessor block, and get back either a freshly mined successor or the
//! reason a received block does not extend it.

pub mod block;
pub mod cancel;
pub mod clock;
pub mod config;
pub mod constants;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod pow;
pub mod validate;

pub use block::{Block, Nonce};
pub use cancel::CancelFlag;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use difficulty::adjust_difficulty;
pub use engine::BlockEngine;
pub use error::{BlockError, Result};
pub use pow::{leading_zero_bits, meets_difficulty};
pub use validate::validate_successor;
