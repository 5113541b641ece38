//! Run identity, stage records, and run outcomes.
//!
//! `RunOutcome` is what the orchestrator returns to the caller.
//! `StageRecord` is what gets written to the run's audit trail, one per stage.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::DdrError, report::DiagnosticReport, validation::ValidationReport};

/// Unique identifier for one pipeline run. Appears in every audit record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStage {
    InspectionExtraction,
    ThermalExtraction,
    MentionCount,
    Validation,
    Generation,
    ReportVerification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageOutcome {
    Passed,
    Failed,
}

/// An immutable record of one stage, written to the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: PipelineStage,
    pub outcome: StageOutcome,
    /// Stage-specific counts or the error message.
    pub detail: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl StageRecord {
    pub fn passed(stage: PipelineStage, detail: serde_json::Value) -> Self {
        Self {
            stage,
            outcome: StageOutcome::Passed,
            detail,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(stage: PipelineStage, detail: serde_json::Value) -> Self {
        Self {
            stage,
            outcome: StageOutcome::Failed,
            detail,
            timestamp: Utc::now(),
        }
    }
}

/// Everything a successful run hands back.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedRun {
    pub run_id: RunId,
    pub report: DiagnosticReport,
    pub markdown: String,
    pub validation: ValidationReport,
    /// Hash of the last audit event; a compact commitment to the whole run.
    pub audit_terminal_hash: String,
}

/// The outcome of a pipeline run that got as far as validation.
///
/// Callers receive either a complete report or a validation failure, never a
/// mix of both. Extraction and generation errors are returned as `Err`.
#[derive(Debug)]
pub enum RunOutcome {
    Complete(Box<CompletedRun>),

    /// Validation failed; the partially built result was discarded.
    Rejected {
        validation: ValidationReport,
        error: DdrError,
    },
}

impl RunOutcome {
    pub fn validation(&self) -> &ValidationReport {
        match self {
            RunOutcome::Complete(run) => &run.validation,
            RunOutcome::Rejected { validation, .. } => validation,
        }
    }

    /// Collapse into a plain result, dropping the validation report on rejection.
    pub fn into_result(self) -> Result<CompletedRun, DdrError> {
        match self {
            RunOutcome::Complete(run) => Ok(*run),
            RunOutcome::Rejected { error, .. } => Err(error),
        }
    }
}
