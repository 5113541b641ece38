//! # ddr-core
//!
//! The fail-closed orchestration layer for diagnostic report generation.
//!
//! This crate provides:
//! - The stage traits (`InspectionScanner`, `ThermalScanner`, `MentionCounter`,
//!   `EntityGate`, `ReportRenderer`, `ReportVerifier`, `AuditWriter`)
//! - The `Pipeline` that sequences them in the correct order
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddr_core::{Pipeline, traits::{AuditWriter, EntityGate, ReportRenderer}};
//! ```

pub mod pipeline;
pub mod traits;

pub use pipeline::Pipeline;
