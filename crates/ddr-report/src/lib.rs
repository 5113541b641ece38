//! # ddr-report
//!
//! Fills the five-section diagnostic report from a frozen extraction and
//! renders it as Markdown.
//!
//! [`TemplateReportGenerator`] implements
//! [`ddr_core::traits::ReportRenderer`]. It accepts only a
//! `FrozenExtraction`, so it can never see data that failed validation.

pub mod generator;
pub mod markdown;

pub use generator::TemplateReportGenerator;
