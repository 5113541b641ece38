//! Post-render verification.
//!
//! `RenderedReportVerifier` implements [`ReportVerifier`]. It checks a
//! rendered report against the frozen extraction it was built from in two
//! phases:
//!
//! 1. **Structural**: the serialized report is validated against
//!    [`report_schema`] with the `jsonschema` crate.
//! 2. **Semantic**: every check in [`CHECKS`] runs in order. Each one compares
//!    a part of the report (or its Markdown) with the frozen source.
//!
//! All failures are collected before returning so the caller sees the full
//! failure set in one pass.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;
use tracing::{debug, warn};

use ddr_contracts::{
    area::RootCause,
    error::{DdrError, DdrResult},
    extraction::FrozenExtraction,
    report::{list_item_text, DiagnosticReport},
    thermal::ThermalAssessment,
    validation::{VerificationFailure, VerificationReport},
};
use ddr_core::traits::ReportVerifier;

/// A semantic check: `Some(message)` when the report disagrees with its source.
pub type SemanticCheck = fn(&Rendered<'_>) -> Option<String>;

/// Everything a semantic check may look at.
pub struct Rendered<'a> {
    pub report: &'a DiagnosticReport,
    pub payload: &'a serde_json::Value,
    pub markdown: &'a str,
    pub source: &'a FrozenExtraction,
}

/// Semantic checks, in evaluation order.
pub const CHECKS: &[(&str, SemanticCheck)] = &[
    ("area-count", check_area_count),
    ("area-identity", check_area_identity),
    ("observations-verbatim", check_observations),
    ("root-cause-locked", check_root_cause),
    ("critical-findings", check_critical_findings),
    ("recommendation-per-room", check_recommendations),
    ("thermal-count", check_thermal_count),
    ("thermal-values", check_thermal_values),
    ("statistics", check_statistics),
    ("markdown-area-headers", check_markdown_headers),
    ("markdown-observations", check_markdown_observations),
];

static AREA_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\*\*Area (?P<n>[0-9]+): ").unwrap());

/// JSON Schema for a serialized `DiagnosticReport`.
pub fn report_schema() -> serde_json::Value {
    let count = json!({ "type": "integer", "minimum": 0 });
    let text = json!({ "type": "string", "minLength": 1 });
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["executive_summary", "area_findings", "thermal_analysis", "recommendations", "statistics"],
        "additionalProperties": false,
        "properties": {
            "executive_summary": {
                "type": "object",
                "required": ["total_impacted_rooms", "critical_findings", "thermal_images_analyzed", "significant_variations"],
                "properties": {
                    "total_impacted_rooms": count,
                    "thermal_images_analyzed": count,
                    "significant_variations": count,
                    "critical_findings": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["room", "observation"],
                            "properties": { "room": text, "observation": text }
                        }
                    }
                }
            },
            "area_findings": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["index", "room", "canonical_room_key", "observations", "root_cause", "recommendation"],
                    "properties": {
                        "index": { "type": "integer", "minimum": 1 },
                        "room": text,
                        "canonical_room_key": text,
                        "observations": { "type": "array", "minItems": 1, "items": text },
                        "root_cause": { "const": RootCause::TEXT },
                        "recommendation": text
                    }
                }
            },
            "thermal_analysis": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["image_id", "hotspot_temp", "coldspot_temp", "temp_difference", "units", "assessment"],
                    "properties": {
                        "image_id": text,
                        "hotspot_temp": { "type": "number" },
                        "coldspot_temp": { "type": "number" },
                        "temp_difference": { "type": "number" },
                        "units": {
                            "type": "object",
                            "required": ["hotspot", "coldspot", "difference"],
                            "properties": {
                                "hotspot": { "type": ["string", "null"] },
                                "coldspot": { "type": ["string", "null"] },
                                "difference": { "type": ["string", "null"] }
                            }
                        },
                        "assessment": { "enum": ["significant-variation", "normal-range"] }
                    }
                }
            },
            "recommendations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["room", "text"],
                    "properties": {
                        "room": text,
                        "category": { "type": ["string", "null"] },
                        "text": text
                    }
                }
            },
            "statistics": {
                "type": "object",
                "required": ["room_count", "reading_count", "recommendation_count", "observation_count", "suppressed_duplicate_count"],
                "properties": {
                    "room_count": count,
                    "reading_count": count,
                    "recommendation_count": count,
                    "observation_count": count,
                    "suppressed_duplicate_count": count
                }
            }
        }
    })
}

/// The report verifier.
pub struct RenderedReportVerifier {
    schema: serde_json::Value,
}

impl RenderedReportVerifier {
    pub fn new() -> Self {
        Self {
            schema: report_schema(),
        }
    }
}

impl Default for RenderedReportVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportVerifier for RenderedReportVerifier {
    fn verify(
        &self,
        report: &DiagnosticReport,
        markdown: &str,
        source: &FrozenExtraction,
    ) -> DdrResult<VerificationReport> {
        let mut failures: Vec<VerificationFailure> = Vec::new();
        let payload = serde_json::to_value(report).map_err(|e| DdrError::ReportVerification {
            reason: format!("report could not be serialized: {e}"),
        })?;

        // ── Phase 1: JSON Schema structural validation ────────────────────────
        match jsonschema::validator_for(&self.schema) {
            Ok(validator) => {
                for error in validator.iter_errors(&payload) {
                    let message = format!("JSON Schema violation at {}: {}", error.instance_path, error);
                    warn!(%message, "structural validation failure");
                    failures.push(VerificationFailure {
                        rule_id: "json-schema".to_string(),
                        message,
                    });
                }
            }
            Err(e) => {
                let message = format!("invalid JSON Schema document: {e}");
                warn!(%message, "schema compilation failure");
                failures.push(VerificationFailure {
                    rule_id: "json-schema".to_string(),
                    message,
                });
            }
        }

        // ── Phase 2: Semantic checks ─────────────────────────────────────────
        let rendered = Rendered {
            report,
            payload: &payload,
            markdown,
            source,
        };
        for (rule_id, check) in CHECKS {
            if let Some(message) = check(&rendered) {
                warn!(rule_id, %message, "semantic check failed");
                failures.push(VerificationFailure {
                    rule_id: (*rule_id).to_string(),
                    message,
                });
            }
        }

        let passed = failures.is_empty();
        debug!(passed, failure_count = failures.len(), "report verification complete");
        Ok(VerificationReport { passed, failures })
    }
}

// ── Semantic checks ───────────────────────────────────────────────────────────

fn check_area_count(r: &Rendered<'_>) -> Option<String> {
    let expected = r.source.areas().len();
    let findings = r.report.area_findings.len();
    let summary = r.report.executive_summary.total_impacted_rooms;
    (findings != expected || summary != expected).then(|| {
        format!("source has {expected} areas, report lists {findings} findings and a summary count of {summary}")
    })
}

fn check_area_identity(r: &Rendered<'_>) -> Option<String> {
    for (i, (finding, area)) in r.report.area_findings.iter().zip(r.source.areas()).enumerate() {
        if finding.index != i + 1 {
            return Some(format!("finding {} is numbered {}", i + 1, finding.index));
        }
        if finding.canonical_room_key != area.canonical_room_key || finding.room != area.display_name {
            return Some(format!(
                "area {} is '{}' ({}) but the source has '{}' ({})",
                i + 1,
                finding.room,
                finding.canonical_room_key,
                area.display_name,
                area.canonical_room_key
            ));
        }
    }
    None
}

fn check_observations(r: &Rendered<'_>) -> Option<String> {
    r.report
        .area_findings
        .iter()
        .zip(r.source.areas())
        .find(|(finding, area)| finding.observations.as_slice() != area.observations())
        .map(|(finding, _)| format!("observations for '{}' differ from the source", finding.room))
}

fn check_root_cause(r: &Rendered<'_>) -> Option<String> {
    let findings = r.payload.get("area_findings")?.as_array()?;
    findings
        .iter()
        .find(|f| f.get("root_cause").and_then(|v| v.as_str()) != Some(RootCause::TEXT))
        .map(|f| {
            format!(
                "root cause for '{}' is not '{}'",
                f.get("room").and_then(|v| v.as_str()).unwrap_or("?"),
                RootCause::TEXT
            )
        })
}

fn check_critical_findings(r: &Rendered<'_>) -> Option<String> {
    let bullets = &r.report.executive_summary.critical_findings;
    if bullets.len() != r.source.areas().len() {
        return Some(format!(
            "{} critical findings for {} areas",
            bullets.len(),
            r.source.areas().len()
        ));
    }
    bullets
        .iter()
        .zip(r.source.areas())
        .find(|(bullet, area)| {
            bullet.room != area.display_name || area.observations().first() != Some(&bullet.observation)
        })
        .map(|(bullet, _)| format!("critical finding for '{}' is not its first observation", bullet.room))
}

fn check_recommendations(r: &Rendered<'_>) -> Option<String> {
    let recs = &r.report.recommendations;
    if recs.len() != r.source.areas().len() {
        return Some(format!(
            "{} recommendations for {} rooms",
            recs.len(),
            r.source.areas().len()
        ));
    }
    recs.iter()
        .zip(&r.report.area_findings)
        .find(|(rec, finding)| rec.room != finding.room || rec.text != finding.recommendation)
        .map(|(rec, _)| format!("recommendation for '{}' does not match its area finding", rec.room))
}

fn check_thermal_count(r: &Rendered<'_>) -> Option<String> {
    let expected = r.source.readings().len();
    let entries = r.report.thermal_analysis.len();
    let summary = r.report.executive_summary.thermal_images_analyzed;
    (entries != expected || summary != expected).then(|| {
        format!("source has {expected} readings, report lists {entries} entries and a summary count of {summary}")
    })
}

fn check_thermal_values(r: &Rendered<'_>) -> Option<String> {
    for (entry, reading) in r.report.thermal_analysis.iter().zip(r.source.readings()) {
        let same = entry.image_id == reading.image_id
            && Some(entry.hotspot_temp) == reading.hotspot_temp
            && Some(entry.coldspot_temp) == reading.coldspot_temp
            && Some(entry.temp_difference) == reading.temp_difference
            && entry.units == reading.units
            && Some(entry.assessment) == reading.assessment;
        if !same {
            return Some(format!("thermal entry '{}' differs from its reading", entry.image_id));
        }
    }
    let significant = r
        .source
        .readings()
        .iter()
        .filter(|t| t.assessment == Some(ThermalAssessment::SignificantVariation))
        .count();
    let reported = r.report.executive_summary.significant_variations;
    (reported != significant)
        .then(|| format!("summary reports {reported} significant variations, source has {significant}"))
}

fn check_statistics(r: &Rendered<'_>) -> Option<String> {
    let s = &r.report.statistics;
    let expected = [
        ("room_count", s.room_count, r.source.areas().len()),
        ("reading_count", s.reading_count, r.source.readings().len()),
        ("recommendation_count", s.recommendation_count, r.report.recommendations.len()),
        ("observation_count", s.observation_count, r.source.observation_count()),
        (
            "suppressed_duplicate_count",
            s.suppressed_duplicate_count,
            r.source.suppressed_duplicates().len(),
        ),
    ];
    let wrong: Vec<String> = expected
        .iter()
        .filter(|(_, reported, actual)| reported != actual)
        .map(|(name, reported, actual)| format!("{name} is {reported}, expected {actual}"))
        .collect();
    (!wrong.is_empty()).then(|| wrong.join(", "))
}

fn check_markdown_headers(r: &Rendered<'_>) -> Option<String> {
    let numbers: Vec<usize> = AREA_HEADER
        .captures_iter(r.markdown)
        .filter_map(|c| c.name("n")?.as_str().parse().ok())
        .collect();
    let expected: Vec<usize> = (1..=r.source.areas().len()).collect();
    (numbers != expected).then(|| {
        format!(
            "markdown has {} 'Area N:' headers {:?}, expected {}",
            numbers.len(),
            numbers,
            expected.len()
        )
    })
}

fn check_markdown_observations(r: &Rendered<'_>) -> Option<String> {
    r.source
        .areas()
        .iter()
        .flat_map(|a| a.observations())
        .find(|obs| !r.markdown.contains(&list_item_text(obs)))
        .map(|obs| format!("markdown is missing observation '{obs}'"))
}
