//! Pipeline assembly and single-run execution.
//!
//! `DdrRuntime` turns a `PipelineConfig` into a concrete `Pipeline` once, then
//! runs document pairs through it. Each run gets its own `RunId` and its own
//! `InMemoryAuditWriter`; no state is carried from one run to the next.

use tracing::info;

use ddr_audit::{AuditLog, InMemoryAuditWriter};
use ddr_config::PipelineConfig;
use ddr_contracts::{
    error::DdrResult,
    execution::{RunId, RunOutcome},
    extraction::SourceDocuments,
    validation::ValidationReport,
};
use ddr_core::pipeline::Pipeline;
use ddr_extract::{InspectionExtractor, StrictMentionCounter, ThermalExtractor};
use ddr_report::TemplateReportGenerator;
use ddr_verify::{EntityLock, RenderedReportVerifier};

/// A run result together with the exported audit trail of that run.
#[derive(Debug)]
pub struct Audited<T> {
    pub value: T,
    pub audit: AuditLog,
}

/// Wire the production components for `config` into a `Pipeline`.
pub fn build_pipeline(config: &PipelineConfig) -> Pipeline {
    Pipeline::new(
        Box::new(InspectionExtractor::new(&config.rooms)),
        Box::new(ThermalExtractor::new(config.thermal.assessment_rule())),
        Box::new(StrictMentionCounter::new(&config.rooms)),
        Box::new(EntityLock::new(config)),
        Box::new(TemplateReportGenerator::new(config.recommendations.clone())),
        Box::new(RenderedReportVerifier::new()),
    )
    .with_parallel_extraction(config.pipeline.parallel_extraction)
}

pub struct DdrRuntime {
    pipeline: Pipeline,
}

impl DdrRuntime {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            pipeline: build_pipeline(config),
        }
    }

    /// A runtime over the configuration shipped with the crate.
    pub fn builtin() -> DdrResult<Self> {
        Ok(Self::new(&PipelineConfig::builtin()?))
    }

    /// Generate a report for `docs` under a fresh audit trail.
    ///
    /// Extraction and generation errors are returned as `Err` and the trail
    /// is discarded with them; a rejected run still comes back with its
    /// finalized trail.
    pub fn run(&self, docs: &SourceDocuments) -> DdrResult<Audited<RunOutcome>> {
        let audit = InMemoryAuditWriter::new(RunId::new());
        let outcome = self.pipeline.run(docs, &audit)?;
        let log = audit.export_log()?;

        info!(
            run_id = %log.run_id,
            complete = matches!(outcome, RunOutcome::Complete(_)),
            events = log.events.len(),
            "run finished"
        );
        Ok(Audited { value: outcome, audit: log })
    }

    /// Extract and validate `docs` without generating a report.
    pub fn validate(&self, docs: &SourceDocuments) -> DdrResult<Audited<ValidationReport>> {
        let audit = InMemoryAuditWriter::new(RunId::new());
        let validation = self.pipeline.validate_only(docs, &audit)?;
        Ok(Audited {
            value: validation,
            audit: audit.export_log()?,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
