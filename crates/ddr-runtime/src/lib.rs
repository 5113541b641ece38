//! # ddr-runtime
//!
//! Assembles the production pipeline from a `PipelineConfig` and runs one
//! inspection/thermal document pair at a time.
//!
//! - [`build_pipeline`] wires the extractors, the independent mention counter,
//!   the entity lock, the template generator and the rendered-report verifier.
//! - [`DdrRuntime::run`] executes a run under a fresh hash-chained audit trail
//!   and hands back the outcome together with the exported log.
//! - [`samples`] holds a fictional document pair for demos and end-to-end tests.

pub mod runtime;
pub mod samples;

pub use runtime::{build_pipeline, Audited, DdrRuntime};
