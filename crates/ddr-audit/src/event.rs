//! Audit event and log types.
//!
//! `AuditEvent` is a single entry in the hash chain: it wraps a `StageRecord`
//! with sequence numbering and the SHA-256 hashes that make tampering
//! detectable. `AuditLog` is the exported record of one run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ddr_contracts::execution::{RunId, StageRecord};

/// A single entry in the SHA-256 hash chain for one run.
///
/// Each event commits to the previous event via `prev_hash`. Modifying any
/// field, including those of the embedded `record`, invalidates `this_hash`
/// and every later `prev_hash`, which `verify_chain` detects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    pub run_id: RunId,

    /// The stage record the pipeline produced.
    pub record: StageRecord,

    /// Hash (hex) of the previous event, or `GENESIS_HASH` for the first.
    pub prev_hash: String,

    /// Computed by `hash_event()` over (run_id, sequence, prev_hash,
    /// canonical JSON of record).
    pub this_hash: String,
}

impl AuditEvent {
    /// The `prev_hash` of the first event in every chain: 64 hex zeros.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// The audit trail of a single run, as exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub run_id: RunId,

    /// All events in chain order (sequence 0 first).
    pub events: Vec<AuditEvent>,

    /// Wall-clock time (UTC) of the export.
    pub exported_at: DateTime<Utc>,

    /// True once the writer was finalized; no event can follow.
    pub sealed: bool,

    /// The `this_hash` of the last event, or `GENESIS_HASH` if there is none.
    pub terminal_hash: String,
}
