//! # ddr-audit
//!
//! Append-only, SHA-256 hash-chained audit trail for one pipeline run.
//!
//! ## Overview
//!
//! Every stage the pipeline records is wrapped in an `AuditEvent` that links
//! to the previous event via its SHA-256 hash. Tampering with any event, even
//! a single byte, breaks the chain and is detected by `verify_chain`. Each run
//! gets a fresh writer; trails are never shared across runs.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddr_audit::InMemoryAuditWriter;
//! use ddr_contracts::execution::RunId;
//! use ddr_core::traits::AuditWriter;
//!
//! let writer = InMemoryAuditWriter::new(RunId::new());
//! writer.write(&stage_record)?;
//! let terminal_hash = writer.finalize()?;
//!
//! assert!(writer.verify_integrity());
//! let log = writer.export_log()?;
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_event, verify_chain};
pub use event::{AuditEvent, AuditLog};
pub use memory::InMemoryAuditWriter;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use ddr_contracts::{
        error::DdrError,
        execution::{PipelineStage, RunId, StageRecord},
    };
    use ddr_core::traits::AuditWriter;

    use super::{AuditEvent, InMemoryAuditWriter};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn record(stage: PipelineStage, areas: usize) -> StageRecord {
        StageRecord::passed(stage, json!({ "areas": areas }))
    }

    fn writer_with_three() -> InMemoryAuditWriter {
        let writer = InMemoryAuditWriter::new(RunId::new());
        writer.write(&record(PipelineStage::InspectionExtraction, 3)).unwrap();
        writer.write(&record(PipelineStage::ThermalExtraction, 0)).unwrap();
        writer.write(&record(PipelineStage::Validation, 3)).unwrap();
        writer
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_hash_chain_integrity() {
        let writer = writer_with_three();
        assert!(writer.verify_integrity(), "chain must be valid after sequential writes");
        assert_eq!(writer.len(), 3);
    }

    /// Mutating any stored record breaks the chain.
    #[test]
    fn test_tamper_detection() {
        let writer = writer_with_three();
        {
            let mut state = writer.state.lock().unwrap();
            state.events[0].record.detail = json!({ "areas": 69 });
        }
        assert!(!writer.verify_integrity(), "chain must detect tampering with a stored event");
    }

    #[test]
    fn test_reordering_is_detected() {
        let writer = writer_with_three();
        {
            let mut state = writer.state.lock().unwrap();
            state.events.swap(1, 2);
        }
        assert!(!writer.verify_integrity());
    }

    #[test]
    fn test_genesis_hash() {
        let writer = InMemoryAuditWriter::new(RunId::new());
        writer.write(&record(PipelineStage::InspectionExtraction, 1)).unwrap();

        let log = writer.export_log().unwrap();
        assert_eq!(log.events.len(), 1);
        assert_eq!(
            log.events[0].prev_hash,
            AuditEvent::GENESIS_HASH,
            "first event must link to the genesis sentinel hash"
        );
    }

    #[test]
    fn test_sequence_monotonic() {
        let log = writer_with_three().export_log().unwrap();
        for (idx, event) in log.events.iter().enumerate() {
            assert_eq!(event.sequence, idx as u64, "sequence at position {idx} should be {idx}");
        }
    }

    #[test]
    fn test_export_log() {
        let writer = writer_with_three();
        let run_id = writer.run_id().clone();
        let log = writer.export_log().unwrap();

        assert_eq!(log.run_id, run_id);
        assert_eq!(log.events.len(), 3, "log must contain all written events");
        assert!(!log.sealed);
        assert_eq!(log.terminal_hash, log.events.last().unwrap().this_hash);
        assert!(super::verify_chain(&log.events), "exported log must pass chain verification");
    }

    #[test]
    fn test_finalize_returns_terminal_hash_and_seals() {
        let writer = writer_with_three();
        let expected = writer.export_log().unwrap().terminal_hash;

        let terminal = writer.finalize().unwrap();
        assert_eq!(terminal, expected);
        assert_eq!(terminal.len(), 64);
        assert!(writer.export_log().unwrap().sealed);

        match writer.write(&record(PipelineStage::Generation, 3)) {
            Err(DdrError::AuditWriteFailed { reason }) => assert!(reason.contains("finalized")),
            other => panic!("expected AuditWriteFailed, got {other:?}"),
        }
        assert!(writer.finalize().is_err(), "a trail is finalized once");
    }

    #[test]
    fn test_runs_do_not_share_chains() {
        let a = InMemoryAuditWriter::new(RunId::new());
        let b = InMemoryAuditWriter::new(RunId::new());
        let same = record(PipelineStage::Validation, 2);
        a.write(&same).unwrap();
        b.write(&same).unwrap();

        let ea = a.export_log().unwrap().events;
        let eb = b.export_log().unwrap().events;
        assert_ne!(ea[0].this_hash, eb[0].this_hash, "hash must commit to the run id");

        let mut mixed = ea.clone();
        let mut foreign = eb[0].clone();
        foreign.sequence = 1;
        foreign.prev_hash = ea[0].this_hash.clone();
        mixed.push(foreign);
        assert!(!super::verify_chain(&mixed));
    }

    #[test]
    fn test_verify_empty() {
        let writer = InMemoryAuditWriter::new(RunId::new());
        assert!(writer.is_empty());
        assert!(writer.verify_integrity(), "an empty chain must be considered valid");
        assert!(super::verify_chain(&[]));
        assert_eq!(writer.finalize().unwrap(), AuditEvent::GENESIS_HASH);
    }
}
