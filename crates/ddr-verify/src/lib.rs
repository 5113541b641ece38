//! # ddr-verify
//!
//! The two gates of the diagnostic report pipeline.
//!
//! - [`lock::EntityLock`] implements [`ddr_core::traits::EntityGate`]. It runs
//!   before anything is rendered: merge-only normalization, the entity-count
//!   lock against the independent mention count, the second thermal
//!   uniqueness pass, room/image separation and the area ceiling.
//! - [`report::RenderedReportVerifier`] implements
//!   [`ddr_core::traits::ReportVerifier`]. It runs after rendering and checks
//!   the report against its frozen source in two phases:
//!
//!   1. **Structural**: JSON Schema validation via the `jsonschema` crate.
//!   2. **Semantic**: counts, verbatim observations, the root-cause lock and
//!      the Markdown `Area N:` headers.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use ddr_config::PipelineConfig;
//! use ddr_verify::{EntityLock, RenderedReportVerifier};
//!
//! let config = PipelineConfig::builtin()?;
//! let gate = EntityLock::new(&config);
//! let verifier = RenderedReportVerifier::new();
//! ```

pub mod lock;
pub mod report;

pub use lock::EntityLock;
pub use report::{report_schema, RenderedReportVerifier};
