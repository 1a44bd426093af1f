use dbhash_core::errors::DbHashError;
use dbhash_core::serde::to_canonical_json_bytes;
use dbhash_core::ComparisonRow;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Computes a stable hexadecimal hash for the provided serializable payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, DbHashError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(bytes);
    Ok(format!("{:x}", digest))
}

/// Fingerprint of a reconciliation outcome.
///
/// Two runs whose inventories reconcile to the same rows share a fingerprint,
/// independent of when or where the report was written.
pub fn rows_fingerprint(rows: &[ComparisonRow]) -> Result<String, DbHashError> {
    stable_hash_string(&rows)
}
