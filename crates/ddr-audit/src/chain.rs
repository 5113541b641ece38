//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Hash input layout (bytes, in order):
//!   1. run_id as its hyphenated UUID string
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. canonical JSON of the stage record (serde_json, no pretty-printing)

use sha2::{Digest, Sha256};

use ddr_contracts::{
    error::{DdrError, DdrResult},
    execution::{RunId, StageRecord},
};

use crate::event::AuditEvent;

/// Compute the SHA-256 hash for a single audit event.
///
/// Returns a lowercase 64-character hex string.
pub fn hash_event(run_id: &RunId, sequence: u64, record: &StageRecord, prev_hash: &str) -> DdrResult<String> {
    let record_json = serde_json::to_vec(record).map_err(|e| DdrError::AuditWriteFailed {
        reason: format!("stage record could not be serialized: {e}"),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(run_id.to_string().as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&record_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify the integrity of a hash chain.
///
/// Valid when all events belong to one run, every event links to its
/// predecessor (or to `GENESIS_HASH`), its sequence equals its position, and
/// its `this_hash` matches the hash recomputed from its own fields. An empty
/// chain is valid.
pub fn verify_chain(events: &[AuditEvent]) -> bool {
    let Some(first) = events.first() else {
        return true;
    };
    let mut expected_prev = AuditEvent::GENESIS_HASH.to_string();

    for (position, event) in events.iter().enumerate() {
        if event.run_id != first.run_id
            || event.prev_hash != expected_prev
            || event.sequence != position as u64
        {
            return false;
        }
        match hash_event(&event.run_id, event.sequence, &event.record, &event.prev_hash) {
            Ok(recomputed) if recomputed == event.this_hash => {}
            _ => return false,
        }
        expected_prev = event.this_hash.clone();
    }

    true
}
