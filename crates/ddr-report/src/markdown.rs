//! Markdown rendering of a [`DiagnosticReport`].
//!
//! A fixed template: the only variable text is what the report already
//! carries. Observations are written verbatim, one bullet each; a multi-line
//! observation keeps its continuation lines indented inside the bullet.

use ddr_contracts::report::{list_item_text, DiagnosticReport, ReportSection};

pub const TITLE: &str = "# Detailed Diagnostic Report";

/// Render the whole report.
pub fn render(report: &DiagnosticReport) -> String {
    let mut out = String::new();
    out.push_str(TITLE);
    out.push_str("\n\n");

    for (n, section) in ReportSection::ALL.iter().enumerate() {
        if n > 0 {
            out.push_str("---\n\n");
        }
        out.push_str(&format!("## {}. {}\n\n", n + 1, section.title()));
        match section {
            ReportSection::ExecutiveSummary => executive_summary(report, &mut out),
            ReportSection::AreaFindings => area_findings(report, &mut out),
            ReportSection::ThermalAnalysis => thermal_analysis(report, &mut out),
            ReportSection::Recommendations => recommendations(report, &mut out),
            ReportSection::SummaryStatistics => statistics(report, &mut out),
        }
    }
    out
}

fn executive_summary(report: &DiagnosticReport, out: &mut String) {
    let summary = &report.executive_summary;
    out.push_str(&format!("**Total Impacted Rooms:** {}\n\n", summary.total_impacted_rooms));
    out.push_str("**Critical Findings:**\n\n");
    for finding in &summary.critical_findings {
        out.push_str(&format!("- **{}:** {}\n", finding.room, list_item_text(&finding.observation)));
    }
    out.push('\n');
    out.push_str("**Thermal Analysis Summary:**\n\n");
    out.push_str(&format!("- Thermal images analyzed: {}\n", summary.thermal_images_analyzed));
    out.push_str(&format!(
        "- Significant temperature variations: {}\n\n",
        summary.significant_variations
    ));
}

fn area_findings(report: &DiagnosticReport, out: &mut String) {
    for finding in &report.area_findings {
        out.push_str(&format!("**Area {}: {}**\n\n", finding.index, finding.room));
        out.push_str("**Observations:**\n\n");
        for obs in &finding.observations {
            out.push_str(&format!("- {}\n", list_item_text(obs)));
        }
        out.push('\n');
        out.push_str(&format!("**Probable Root Cause:** {}\n\n", finding.root_cause));
        out.push_str(&format!("**Recommendation:** {}\n\n", finding.recommendation));
    }
}

fn thermal_analysis(report: &DiagnosticReport, out: &mut String) {
    for entry in &report.thermal_analysis {
        out.push_str(&format!("**Image ID:** {}\n\n", entry.image_id));
        let units = &entry.units;
        out.push_str(&format!(
            "- Hotspot Temperature: {}\n",
            temperature(entry.hotspot_temp, units.hotspot.as_deref())
        ));
        out.push_str(&format!(
            "- Coldspot Temperature: {}\n",
            temperature(entry.coldspot_temp, units.coldspot.as_deref())
        ));
        out.push_str(&format!(
            "- Temperature Difference: {}\n",
            temperature(entry.temp_difference, units.difference.as_deref())
        ));
        out.push_str(&format!("- Assessment: {}\n\n", entry.assessment));
    }
}

fn recommendations(report: &DiagnosticReport, out: &mut String) {
    for rec in &report.recommendations {
        out.push_str(&format!("**{}**\n\n", rec.room));
        out.push_str(&format!("**Recommended Action:** {}\n\n", rec.text));
    }
}

fn statistics(report: &DiagnosticReport, out: &mut String) {
    let s = &report.statistics;
    out.push_str(&format!("- Total Impacted Rooms: {}\n", s.room_count));
    out.push_str(&format!("- Total Thermal Readings: {}\n", s.reading_count));
    out.push_str(&format!("- Recommendations Provided: {}\n", s.recommendation_count));
    out.push_str(&format!("- Observations Recorded: {}\n", s.observation_count));
    out.push_str(&format!("- Duplicate Thermal Blocks Suppressed: {}\n", s.suppressed_duplicate_count));
}

/// A value with the unit printed beside it in the source, and no other.
fn temperature(value: f64, unit: Option<&str>) -> String {
    match unit {
        Some(unit) => format!("{value} {unit}"),
        None => value.to_string(),
    }
}
