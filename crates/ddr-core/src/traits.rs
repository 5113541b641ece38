//! Core trait definitions for the diagnostic report pipeline.
//!
//! These traits define the stage boundaries:
//!
//! - `InspectionScanner` / `ThermalScanner`: extraction, one per document
//! - `MentionCounter`: the independent second count of rooms
//! - `EntityGate`: validation and merge-only normalization
//! - `ReportRenderer`: template filling over a frozen result
//! - `ReportVerifier`: checks the rendered report against its source
//! - `AuditWriter`: records every stage immutably
//!
//! The pipeline wires them together in order. A renderer is never handed data
//! that has not passed the gate, because the only input it accepts is a
//! `FrozenExtraction`, which can only be built from a passing report.

use ddr_contracts::{
    error::{DdrError, DdrResult},
    execution::{RunId, StageRecord},
    extraction::{ExtractionResult, FrozenExtraction, InspectionExtraction, ThermalExtraction},
    report::DiagnosticReport,
    thermal::{DuplicateRecord, ThermalReading},
    validation::{ExpectedRooms, InvariantCheck, InvariantClass, ValidationReport, VerificationReport},
};

/// Extracts impacted areas from inspection text.
pub trait InspectionScanner: Send + Sync {
    /// Scan `text` and return every recognized room with its observations.
    ///
    /// Fails with `DdrError::Extraction` when no room is recognized or when a
    /// match cannot be attributed to a room without guessing.
    fn scan(&self, text: &str) -> DdrResult<InspectionExtraction>;
}

/// Extracts thermal readings from thermal-report text.
pub trait ThermalScanner: Send + Sync {
    /// Scan `text` and return at most one reading per image ID, plus the
    /// duplicates that were dropped.
    fn scan(&self, text: &str) -> DdrResult<ThermalExtraction>;
}

/// Counts room mentions without sharing code with the inspection scanner.
pub trait MentionCounter: Send + Sync {
    fn count(&self, text: &str) -> DdrResult<ExpectedRooms>;
}

/// The validation stage. Nothing is rendered unless this passes.
pub trait EntityGate: Send + Sync {
    /// Consolidate areas under their existing keys.
    ///
    /// Must fail with `DdrError::StructuralIntegrity` rather than create a key.
    fn normalize(&self, result: &mut ExtractionResult) -> DdrResult<InvariantCheck>;

    /// Compare the extracted room keys against the independent count.
    fn lock_entity_count(&self, result: &ExtractionResult, expected: &ExpectedRooms) -> InvariantCheck;

    /// Split `readings` into first occurrences and later duplicates.
    fn deduplicate_thermal(&self, readings: &[ThermalReading]) -> (Vec<ThermalReading>, Vec<DuplicateRecord>);

    /// Check that image IDs and room names stayed on their own side.
    fn check_separation(&self, result: &ExtractionResult) -> InvariantCheck;

    fn check_area_limit(&self, result: &ExtractionResult) -> InvariantCheck;

    /// Run every check in order and collect the outcomes.
    ///
    /// A normalization error stops the sequence; the other checks all run so
    /// the report lists every failing invariant at once.
    fn validate(&self, result: &mut ExtractionResult, expected: &ExpectedRooms) -> ValidationReport {
        let mut report = ValidationReport::with_suppressed(result.suppressed_duplicates().to_vec());

        match self.normalize(result) {
            Ok(check) => report.record(check),
            Err(err) => {
                let offending = match &err {
                    DdrError::StructuralIntegrity { offending, .. } => offending.clone(),
                    _ => Vec::new(),
                };
                report.record(InvariantCheck::fail(
                    InvariantClass::Normalization,
                    offending,
                    err.to_string(),
                ));
                return report;
            }
        }

        report.record(self.lock_entity_count(result, expected));

        let total = result.readings().len();
        let (unique, duplicates) = self.deduplicate_thermal(result.readings());
        if duplicates.is_empty() {
            report.record(
                InvariantCheck::pass(
                    InvariantClass::DuplicateThermalIds,
                    format!("{} thermal readings, all image ids unique", total),
                )
                .with_counts(unique.len(), total),
            );
        } else {
            let mut offending: Vec<String> = Vec::new();
            for dup in &duplicates {
                if !offending.contains(&dup.image_id) {
                    offending.push(dup.image_id.clone());
                }
            }
            report.record(
                InvariantCheck::fail(
                    InvariantClass::DuplicateThermalIds,
                    offending.clone(),
                    format!("duplicate image ids survived extraction: {}", offending.join(", ")),
                )
                .with_counts(unique.len(), total),
            );
            report.reject_duplicates(duplicates);
        }
        if let Err(err) = result.retain_readings(unique) {
            report.record(InvariantCheck::fail(
                InvariantClass::DuplicateThermalIds,
                Vec::new(),
                err.to_string(),
            ));
        }

        report.record(self.check_separation(result));
        report.record(self.check_area_limit(result));
        report
    }
}

/// Renders the five fixed sections from a frozen result.
pub trait ReportRenderer: Send + Sync {
    /// Fill the report template.
    ///
    /// Fails with `DdrError::IncompleteData` if a section needs a field the
    /// frozen result does not carry.
    fn render(&self, frozen: &FrozenExtraction) -> DdrResult<DiagnosticReport>;

    fn to_markdown(&self, report: &DiagnosticReport) -> String;
}

/// Checks a rendered report against the frozen result it was built from.
pub trait ReportVerifier: Send + Sync {
    fn verify(
        &self,
        report: &DiagnosticReport,
        markdown: &str,
        source: &FrozenExtraction,
    ) -> DdrResult<VerificationReport>;
}

/// The audit writer: the immutable record of one run.
///
/// Every stage, whether it passed or failed, produces exactly one
/// `StageRecord` that must be persisted. A failed write is fatal.
pub trait AuditWriter: Send + Sync {
    /// The run this writer records.
    fn run_id(&self) -> &RunId;

    /// Append one stage record. Records are never modified or deleted.
    fn write(&self, record: &StageRecord) -> DdrResult<()>;

    /// Seal the run's trail and return its terminal hash.
    fn finalize(&self) -> DdrResult<String>;
}
