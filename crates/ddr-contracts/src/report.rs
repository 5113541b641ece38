//! The rendered diagnostic report.
//!
//! A `DiagnosticReport` has exactly five sections, in a fixed order. Every
//! string in it is either copied from a `FrozenExtraction` field, a count over
//! that extraction, or a configured recommendation line chosen by lookup.

use serde::{Deserialize, Serialize};

use crate::{
    area::{CanonicalKey, RootCause},
    thermal::{ReadingUnits, ThermalAssessment},
};

/// The five sections, in render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportSection {
    ExecutiveSummary,
    AreaFindings,
    ThermalAnalysis,
    Recommendations,
    SummaryStatistics,
}

impl ReportSection {
    pub const ALL: [ReportSection; 5] = [
        ReportSection::ExecutiveSummary,
        ReportSection::AreaFindings,
        ReportSection::ThermalAnalysis,
        ReportSection::Recommendations,
        ReportSection::SummaryStatistics,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ReportSection::ExecutiveSummary => "Executive Summary",
            ReportSection::AreaFindings => "Area-wise Findings",
            ReportSection::ThermalAnalysis => "Thermal Analysis",
            ReportSection::Recommendations => "Recommendations",
            ReportSection::SummaryStatistics => "Summary Statistics",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub executive_summary: ExecutiveSummary,
    pub area_findings: Vec<AreaFinding>,
    pub thermal_analysis: Vec<ThermalEntry>,
    pub recommendations: Vec<RoomRecommendation>,
    pub statistics: SummaryStatistics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub total_impacted_rooms: usize,
    /// One bullet per room: the room's first observation, verbatim.
    pub critical_findings: Vec<CriticalFinding>,
    pub thermal_images_analyzed: usize,
    pub significant_variations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalFinding {
    pub room: String,
    pub observation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaFinding {
    /// 1-based position, used in the `Area N:` header.
    pub index: usize,
    pub room: String,
    pub canonical_room_key: CanonicalKey,
    pub observations: Vec<String>,
    pub root_cause: RootCause,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalEntry {
    pub image_id: String,
    pub hotspot_temp: f64,
    pub coldspot_temp: f64,
    pub temp_difference: f64,
    pub units: ReadingUnits,
    pub assessment: ThermalAssessment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecommendation {
    pub room: String,
    /// Category of the lookup rule that matched; `None` for the fallback line.
    pub category: Option<String>,
    pub text: String,
}

/// Pure counts over the frozen extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub room_count: usize,
    pub reading_count: usize,
    pub recommendation_count: usize,
    pub observation_count: usize,
    pub suppressed_duplicate_count: usize,
}

/// Text laid out as a Markdown list item body: every line after the first is
/// indented two spaces so it stays inside the item and can never start a
/// block of its own.
pub fn list_item_text(text: &str) -> String {
    text.replace('\n', "\n  ")
}
