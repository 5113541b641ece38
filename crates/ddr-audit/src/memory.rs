//! In-memory implementation of `AuditWriter`.
//!
//! `InMemoryAuditWriter` keeps one run's events in a `Vec` behind a `Mutex`,
//! so both extraction threads can write through a shared reference. One
//! writer per run; it is never reused.
//!
//! Use `export_log()` to obtain the `AuditLog`, and `verify_integrity()` at
//! any time to confirm the chain has not been tampered with in memory.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info};

use ddr_contracts::{
    error::{DdrError, DdrResult},
    execution::{RunId, StageRecord},
};
use ddr_core::traits::AuditWriter;

use crate::{
    chain::{hash_event, verify_chain},
    event::{AuditEvent, AuditLog},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct InMemoryState {
    /// All events written so far, in append order.
    pub(crate) events: Vec<AuditEvent>,

    /// The next sequence number to assign.
    pub(crate) sequence: u64,

    /// The `this_hash` of the last event, or `GENESIS_HASH` before the first.
    pub(crate) last_hash: String,

    /// Set by `finalize`; later writes are refused.
    pub(crate) sealed: bool,
}

// ── Public writer ─────────────────────────────────────────────────────────────

/// An in-memory, append-only audit writer backed by a SHA-256 hash chain.
pub struct InMemoryAuditWriter {
    run_id: RunId,
    pub(crate) state: Mutex<InMemoryState>,
}

impl InMemoryAuditWriter {
    /// Create an empty trail for `run_id`.
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            state: Mutex::new(InMemoryState {
                events: Vec::new(),
                sequence: 0,
                last_hash: AuditEvent::GENESIS_HASH.to_string(),
                sealed: false,
            }),
        }
    }

    fn lock(&self) -> DdrResult<MutexGuard<'_, InMemoryState>> {
        self.state.lock().map_err(|e| DdrError::AuditWriteFailed {
            reason: format!("audit state lock poisoned: {e}"),
        })
    }

    /// Export every event written so far.
    pub fn export_log(&self) -> DdrResult<AuditLog> {
        let state = self.lock()?;
        Ok(AuditLog {
            run_id: self.run_id.clone(),
            events: state.events.clone(),
            exported_at: Utc::now(),
            sealed: state.sealed,
            terminal_hash: state.last_hash.clone(),
        })
    }

    /// Check prev-hash linkage and hash correctness for every event.
    ///
    /// A poisoned lock counts as a broken chain.
    pub fn verify_integrity(&self) -> bool {
        match self.lock() {
            Ok(state) => verify_chain(&state.events),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|s| s.events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── AuditWriter impl ──────────────────────────────────────────────────────────

impl AuditWriter for InMemoryAuditWriter {
    fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Append one stage record to the hash chain.
    ///
    /// Fails with `AuditWriteFailed` once the trail is sealed, or if the lock
    /// is poisoned.
    fn write(&self, record: &StageRecord) -> DdrResult<()> {
        let mut state = self.lock()?;
        if state.sealed {
            return Err(DdrError::AuditWriteFailed {
                reason: format!("audit trail for run {} is already finalized", self.run_id),
            });
        }

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;
        let this_hash = hash_event(&self.run_id, sequence, record, &prev_hash)?;

        state.events.push(AuditEvent {
            sequence,
            run_id: self.run_id.clone(),
            record: record.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.sequence += 1;
        state.last_hash = this_hash;

        debug!(run_id = %self.run_id, sequence, stage = ?record.stage, "stage audited");
        Ok(())
    }

    /// Seal the trail and return its terminal hash.
    fn finalize(&self) -> DdrResult<String> {
        let mut state = self.lock()?;
        if state.sealed {
            return Err(DdrError::AuditWriteFailed {
                reason: format!("audit trail for run {} is already finalized", self.run_id),
            });
        }
        state.sealed = true;

        info!(
            run_id = %self.run_id,
            event_count = state.events.len(),
            terminal_hash = %state.last_hash,
            "audit log finalized"
        );
        Ok(state.last_hash.clone())
    }
}
