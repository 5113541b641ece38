//! The pipeline orchestrator: the fail-closed stage sequencer.
//!
//! The pipeline enforces the run model:
//!
//!   Extract (inspection ∥ thermal) → Count → Validate → Seal → Render → Verify → Audit
//!
//! The only parallelism is between the two extractors, joined before
//! validation. Rendering is reachable only through `FrozenExtraction::seal`,
//! which refuses a failed `ValidationReport`; there is no path from a failed
//! validation to the renderer.

use serde_json::json;
use tracing::{debug, info, warn};

use ddr_contracts::{
    error::{DdrError, DdrResult},
    execution::{CompletedRun, PipelineStage, RunOutcome, StageRecord},
    extraction::{
        DocumentKind, ExtractionResult, FrozenExtraction, InspectionExtraction, SourceDocuments,
        ThermalExtraction,
    },
    validation::ValidationReport,
};

use crate::traits::{
    AuditWriter, EntityGate, InspectionScanner, MentionCounter, ReportRenderer, ReportVerifier,
    ThermalScanner,
};

/// The orchestrator for one document pair at a time.
///
/// Holds only stateless components; every call to `run` builds its own
/// `ExtractionResult` and drops it when the call returns.
pub struct Pipeline {
    inspection: Box<dyn InspectionScanner>,
    thermal: Box<dyn ThermalScanner>,
    counter: Box<dyn MentionCounter>,
    gate: Box<dyn EntityGate>,
    renderer: Box<dyn ReportRenderer>,
    verifier: Box<dyn ReportVerifier>,
    parallel_extraction: bool,
}

impl Pipeline {
    pub fn new(
        inspection: Box<dyn InspectionScanner>,
        thermal: Box<dyn ThermalScanner>,
        counter: Box<dyn MentionCounter>,
        gate: Box<dyn EntityGate>,
        renderer: Box<dyn ReportRenderer>,
        verifier: Box<dyn ReportVerifier>,
    ) -> Self {
        Self {
            inspection,
            thermal,
            counter,
            gate,
            renderer,
            verifier,
            parallel_extraction: false,
        }
    }

    /// Run the two extractors on separate threads with a join barrier.
    pub fn with_parallel_extraction(mut self, parallel: bool) -> Self {
        self.parallel_extraction = parallel;
        self
    }

    /// Execute a full run over `docs`.
    ///
    /// # Stages
    ///
    /// 1. Extract both documents; an extraction error is returned as `Err`
    /// 2. Count expected rooms with the independent counter
    /// 3. Validate; a failing report returns `RunOutcome::Rejected` and the
    ///    partial result is dropped
    /// 4. Seal, render, and verify the rendered report
    /// 5. Finalize the audit trail and return `RunOutcome::Complete`
    ///
    /// Each stage writes exactly one `StageRecord` to `audit`.
    pub fn run(&self, docs: &SourceDocuments, audit: &dyn AuditWriter) -> DdrResult<RunOutcome> {
        let run_id = audit.run_id().clone();
        info!(run_id = %run_id, "pipeline run starting");

        let (result, validation) = self.extract_and_validate(docs, audit)?;

        if !validation.passed() {
            let error = rejection(&validation);
            warn!(
                run_id = %run_id,
                failures = %validation.failure_summary(),
                "validation failed, run rejected before generation"
            );
            // The partially built result is discarded here.
            drop(result);
            audit.finalize()?;
            return Ok(RunOutcome::Rejected { validation, error });
        }

        // ── Seal ─────────────────────────────────────────────────────────────
        //
        // The only way to obtain a FrozenExtraction, and so the only way into
        // the renderer.
        let frozen = FrozenExtraction::seal(result, &validation)?;

        // ── Generation ───────────────────────────────────────────────────────
        let report = audited(
            audit,
            PipelineStage::Generation,
            self.renderer.render(&frozen),
            |report| {
                json!({
                    "areas": report.area_findings.len(),
                    "thermal_entries": report.thermal_analysis.len(),
                    "recommendations": report.recommendations.len(),
                })
            },
        )?;
        let markdown = self.renderer.to_markdown(&report);

        // ── Post-render verification ─────────────────────────────────────────
        let verification = self
            .verifier
            .verify(&report, &markdown, &frozen)
            .and_then(|v| {
                if v.passed {
                    Ok(v)
                } else {
                    let reason = v
                        .failures
                        .iter()
                        .map(|f| format!("[{}] {}", f.rule_id, f.message))
                        .collect::<Vec<_>>()
                        .join("; ");
                    Err(DdrError::ReportVerification { reason })
                }
            });
        audited(audit, PipelineStage::ReportVerification, verification, |v| {
            json!({ "failures": v.failures.len() })
        })?;

        let audit_terminal_hash = audit.finalize()?;
        info!(
            run_id = %run_id,
            areas = report.area_findings.len(),
            readings = report.thermal_analysis.len(),
            "pipeline run complete"
        );

        Ok(RunOutcome::Complete(Box::new(CompletedRun {
            run_id,
            report,
            markdown,
            validation,
            audit_terminal_hash,
        })))
    }

    /// Run extraction, counting and validation only, and return the report.
    pub fn validate_only(&self, docs: &SourceDocuments, audit: &dyn AuditWriter) -> DdrResult<ValidationReport> {
        let (_result, validation) = self.extract_and_validate(docs, audit)?;
        audit.finalize()?;
        Ok(validation)
    }

    fn extract_and_validate(
        &self,
        docs: &SourceDocuments,
        audit: &dyn AuditWriter,
    ) -> DdrResult<(ExtractionResult, ValidationReport)> {
        // ── Extraction ───────────────────────────────────────────────────────
        let (inspection, thermal) = self.extract(docs);

        let inspection = audited(audit, PipelineStage::InspectionExtraction, inspection, |ext| {
            json!({
                "areas": ext.areas().len(),
                "observations": ext.areas().iter().map(|a| a.observations().len()).sum::<usize>(),
            })
        });
        let thermal = audited(audit, PipelineStage::ThermalExtraction, thermal, |ext| {
            json!({
                "readings": ext.readings.len(),
                "suppressed_duplicates": ext.duplicates.len(),
            })
        });
        let (inspection, thermal) = (inspection?, thermal?);

        // ── Independent count ────────────────────────────────────────────────
        let expected = audited(
            audit,
            PipelineStage::MentionCount,
            self.counter.count(&docs.inspection),
            |expected| json!({ "expected_rooms": expected.count() }),
        )?;

        // ── Validation ───────────────────────────────────────────────────────
        let mut result = ExtractionResult::from_parts(inspection, thermal);
        let validation = self.gate.validate(&mut result, &expected);

        let detail = json!({
            "passed": validation.passed(),
            "expected_rooms": expected.count(),
            "areas": result.areas().len(),
            "readings": result.readings().len(),
            "failures": validation.failure_summary(),
        });
        let record = if validation.passed() {
            StageRecord::passed(PipelineStage::Validation, detail)
        } else {
            StageRecord::failed(PipelineStage::Validation, detail)
        };
        audit.write(&record)?;

        debug!(
            passed = validation.passed(),
            checks = validation.checks().len(),
            "validation stage finished"
        );
        Ok((result, validation))
    }

    fn extract(
        &self,
        docs: &SourceDocuments,
    ) -> (DdrResult<InspectionExtraction>, DdrResult<ThermalExtraction>) {
        if !self.parallel_extraction {
            return (
                self.inspection.scan(&docs.inspection),
                self.thermal.scan(&docs.thermal),
            );
        }

        std::thread::scope(|scope| {
            let thermal = scope.spawn(|| self.thermal.scan(&docs.thermal));
            let inspection = self.inspection.scan(&docs.inspection);
            let thermal = thermal.join().unwrap_or_else(|_| {
                Err(DdrError::Extraction {
                    document: DocumentKind::Thermal,
                    reason: "thermal extraction thread panicked".to_string(),
                })
            });
            (inspection, thermal)
        })
    }
}

/// Write one stage record for `result` and pass it through.
fn audited<T>(
    audit: &dyn AuditWriter,
    stage: PipelineStage,
    result: DdrResult<T>,
    detail: impl FnOnce(&T) -> serde_json::Value,
) -> DdrResult<T> {
    match result {
        Ok(value) => {
            audit.write(&StageRecord::passed(stage, detail(&value)))?;
            Ok(value)
        }
        Err(err) => {
            warn!(stage = ?stage, error = %err, "pipeline stage failed");
            audit.write(&StageRecord::failed(stage, json!({ "error": err.to_string() })))?;
            Err(err)
        }
    }
}

fn rejection(validation: &ValidationReport) -> DdrError {
    validation
        .rejection_error()
        .unwrap_or_else(|| DdrError::StructuralIntegrity {
            reason: "validation reported failure without a failing check".to_string(),
            offending: Vec::new(),
        })
}

// ── Tests ────────────────────────────────────────────────────────────────────
