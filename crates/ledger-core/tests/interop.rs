//! Blocks and digests produced by an independent implementation of the same
//! hashing and validation rules must be accepted unchanged.

use ledger_core::{crypto_hash, validate_successor, Block, BlockError, Nonce};
use serde_json::json;

type TestResult = Result<(), BlockError>;

const FIRST: &str = r#"{"timestamp": 1792116084769352761, "last_hash": "genesis_hash", "hash": "28cd9565086d0a8e6457999b788cf59a067acece41dd668f9301f103a26cfff1", "data": [{"recipient": "bob", "amount": 5, "memo": "caf\u00e9"}], "difficulty": 2, "nonce": 5}"#;
const SECOND: &str = r#"{"timestamp": 1792116084771752161, "last_hash": "28cd9565086d0a8e6457999b788cf59a067acece41dd668f9301f103a26cfff1", "hash": "1c7a491dc4694dde4c5afd8702865c1116b3865d86eccb86de8df5ba2d7aaa6a", "data": "second", "difficulty": 3, "nonce": 30}"#;

#[test]
fn reference_digests() {
    assert_eq!(
        crypto_hash!("one", 2, [3]).unwrap(),
        "49d135ee795768472bd5f9e5d11c3982e6bdeae55bc86a0f4351654e3d4e8b2a"
    );
    assert_eq!(
        crypto_hash!(2, [3], "one").unwrap(),
        "49d135ee795768472bd5f9e5d11c3982e6bdeae55bc86a0f4351654e3d4e8b2a"
    );
}

#[test]
fn foreign_chain_validates() -> TestResult {
    let genesis = Block::genesis();
    let first = Block::from_json(FIRST)?;
    let second = Block::from_json(SECOND)?;

    assert_eq!(first.data()[0]["memo"], json!("café"));
    assert_eq!(second.nonce(), &Nonce::Counter(30));

    validate_successor(&genesis, &first)?;
    validate_successor(&first, &second)?;
    Ok(())
}

#[test]
fn foreign_block_reserializes_with_current_keys() -> TestResult {
    let first = Block::from_json(FIRST)?;
    let record = first.serialize();
    assert_eq!(record["previousHash"], json!("genesis_hash"));
    assert!(record.get("last_hash").is_none());
    assert_eq!(Block::from_serialized(&record)?, first);
    Ok(())
}

#[test]
fn foreign_block_tampering_is_caught() -> TestResult {
    let first = Block::from_json(FIRST)?;
    let mut record = Block::from_json(SECOND)?.serialize();
    record["data"] = json!("forged");
    let forged = Block::from_serialized(&record)?;
    let err = validate_successor(&first, &forged).unwrap_err();
    assert!(matches!(err, BlockError::HashMismatch { .. }));

    // Swapping predecessors breaks the link.
    let err = validate_successor(&Block::genesis(), &Block::from_json(SECOND)?).unwrap_err();
    assert!(matches!(err, BlockError::BrokenChainLink { .. }));
    Ok(())
}
