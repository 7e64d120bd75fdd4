use crate::constants::{
    GENESIS_DIFFICULTY, GENESIS_HASH, GENESIS_NONCE, GENESIS_PREVIOUS_HASH, GENESIS_TIMESTAMP,
};
use crate::error::{BlockError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Proof-of-work search counter.
///
/// Mined blocks carry a counter; genesis carries a fixed text sentinel instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nonce {
    Counter(u64),
    Sentinel(String),
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nonce::Counter(n) => write!(f, "{n}"),
            Nonce::Sentinel(s) => f.write_str(s),
        }
    }
}

/// One record of the ledger.
///
/// Blocks are only produced by [`Block::genesis`], by mining, or by
/// [`Block::from_serialized`], and are read-only afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Block {
    timestamp: u64,
    #[serde(alias = "last_hash")]
    previous_hash: String,
    hash: String,
    data: Value,
    difficulty: u32,
    nonce: Nonce,
}

impl Block {
    pub(crate) fn from_parts(
        timestamp: u64,
        previous_hash: String,
        hash: String,
        data: Value,
        difficulty: u32,
        nonce: Nonce,
    ) -> Self {
        Self {
            timestamp,
            previous_hash,
            hash,
            data,
            difficulty,
            nonce,
        }
    }

    /// The hard-coded root of every chain.
    pub fn genesis() -> Self {
        Self::from_parts(
            GENESIS_TIMESTAMP,
            GENESIS_PREVIOUS_HASH.to_string(),
            GENESIS_HASH.to_string(),
            Value::Array(Vec::new()),
            GENESIS_DIFFICULTY,
            Nonce::Sentinel(GENESIS_NONCE.to_string()),
        )
    }

    pub fn is_genesis(&self) -> bool {
        *self == Self::genesis()
    }

    /// Digest binding a block's five content fields together.
    pub fn digest(
        timestamp: u64,
        previous_hash: &str,
        data: &Value,
        difficulty: u32,
        nonce: &Nonce,
    ) -> Result<String> {
        crate::crypto_hash!(timestamp, previous_hash, data, difficulty, nonce)
    }

    /// Recompute the digest from this block's own fields.
    pub fn recompute_hash(&self) -> Result<String> {
        Self::digest(
            self.timestamp,
            &self.previous_hash,
            &self.data,
            self.difficulty,
            &self.nonce,
        )
    }

    /// Field map with the keys `timestamp, previousHash, hash, data, difficulty, nonce`.
    pub fn serialize(&self) -> Value {
        let mut map = serde_json::Map::with_capacity(6);
        map.insert("timestamp".into(), Value::from(self.timestamp));
        map.insert("previousHash".into(), Value::from(self.previous_hash.clone()));
        map.insert("hash".into(), Value::from(self.hash.clone()));
        map.insert("data".into(), self.data.clone());
        map.insert("difficulty".into(), Value::from(self.difficulty));
        let nonce = match &self.nonce {
            Nonce::Counter(n) => Value::from(*n),
            Nonce::Sentinel(s) => Value::from(s.clone()),
        };
        map.insert("nonce".into(), nonce);
        Value::Object(map)
    }

    /// Rebuild a block from its field map. Checks shape only, never the hash.
    pub fn from_serialized(record: &Value) -> Result<Self> {
        let block = Self::deserialize(record).map_err(|e| BlockError::MalformedBlock(e.to_string()))?;
        block.check_shape()
    }

    pub fn to_json(&self) -> String {
        self.serialize().to_string()
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let block: Self =
            serde_json::from_str(raw).map_err(|e| BlockError::MalformedBlock(e.to_string()))?;
        block.check_shape()
    }

    fn check_shape(self) -> Result<Self> {
        if self.difficulty == 0 {
            return Err(BlockError::MalformedBlock(
                "difficulty must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block(timestamp: {}, previous_hash: {}, hash: {}, data: {}, difficulty: {}, nonce: {})",
            self.timestamp, self.previous_hash, self.hash, self.data, self.difficulty, self.nonce
        )
    }
}
