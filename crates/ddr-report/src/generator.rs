//! Closed-grammar report generator.
//!
//! Every value in a [`DiagnosticReport`] comes from one of three places: a
//! field of the frozen extraction copied verbatim, a count over it, or a
//! recommendation line picked from the configured table by keyword lookup.
//! There is no free text. A section that needs a field the frozen result does
//! not carry fails with `IncompleteData` instead of printing a placeholder.

use tracing::{debug, info};

use ddr_config::RecommendationTable;
use ddr_contracts::{
    area::ImpactedArea,
    error::{DdrError, DdrResult},
    extraction::FrozenExtraction,
    report::{
        AreaFinding, CriticalFinding, DiagnosticReport, ExecutiveSummary, ReportSection, RoomRecommendation,
        SummaryStatistics, ThermalEntry,
    },
    thermal::{ThermalAssessment, ThermalReading},
};
use ddr_core::traits::ReportRenderer;

use crate::markdown;

pub struct TemplateReportGenerator {
    recommendations: RecommendationTable,
}

impl TemplateReportGenerator {
    pub fn new(recommendations: RecommendationTable) -> Self {
        Self { recommendations }
    }

    /// The recommendation for one area: the first matching rule, else the fallback.
    pub fn recommend(&self, area: &ImpactedArea) -> RoomRecommendation {
        match self.recommendations.select(area.observations()) {
            Some(rule) => RoomRecommendation {
                room: area.display_name.clone(),
                category: Some(rule.category.clone()),
                text: rule.text.clone(),
            },
            None => RoomRecommendation {
                room: area.display_name.clone(),
                category: None,
                text: self.recommendations.fallback.clone(),
            },
        }
    }
}

fn missing(section: ReportSection, entity: &str, field: &str) -> DdrError {
    DdrError::IncompleteData {
        section: section.title().to_string(),
        entity: entity.to_string(),
        field: field.to_string(),
    }
}

fn thermal_entry(reading: &ThermalReading) -> DdrResult<ThermalEntry> {
    let need = |value: Option<f64>, field: &str| {
        value.ok_or_else(|| missing(ReportSection::ThermalAnalysis, &reading.image_id, field))
    };
    Ok(ThermalEntry {
        image_id: reading.image_id.clone(),
        hotspot_temp: need(reading.hotspot_temp, "hotspot_temp")?,
        coldspot_temp: need(reading.coldspot_temp, "coldspot_temp")?,
        temp_difference: need(reading.temp_difference, "temp_difference")?,
        units: reading.units.clone(),
        assessment: reading
            .assessment
            .ok_or_else(|| missing(ReportSection::ThermalAnalysis, &reading.image_id, "assessment"))?,
    })
}

impl ReportRenderer for TemplateReportGenerator {
    fn render(&self, frozen: &FrozenExtraction) -> DdrResult<DiagnosticReport> {
        let mut critical_findings = Vec::with_capacity(frozen.areas().len());
        let mut area_findings = Vec::with_capacity(frozen.areas().len());
        let mut recommendations = Vec::with_capacity(frozen.areas().len());

        for (i, area) in frozen.areas().iter().enumerate() {
            let first = area
                .observations()
                .first()
                .ok_or_else(|| missing(ReportSection::AreaFindings, area.canonical_room_key.as_str(), "observations"))?;
            let recommendation = self.recommend(area);
            debug!(
                room = %area.canonical_room_key,
                category = recommendation.category.as_deref().unwrap_or("fallback"),
                "recommendation selected"
            );

            critical_findings.push(CriticalFinding {
                room: area.display_name.clone(),
                observation: first.clone(),
            });
            area_findings.push(AreaFinding {
                index: i + 1,
                room: area.display_name.clone(),
                canonical_room_key: area.canonical_room_key.clone(),
                observations: area.observations().to_vec(),
                root_cause: area.root_cause,
                recommendation: recommendation.text.clone(),
            });
            recommendations.push(recommendation);
        }

        let thermal_analysis = frozen
            .readings()
            .iter()
            .map(thermal_entry)
            .collect::<DdrResult<Vec<_>>>()?;
        let significant_variations = thermal_analysis
            .iter()
            .filter(|t| t.assessment == ThermalAssessment::SignificantVariation)
            .count();

        let report = DiagnosticReport {
            executive_summary: ExecutiveSummary {
                total_impacted_rooms: area_findings.len(),
                critical_findings,
                thermal_images_analyzed: thermal_analysis.len(),
                significant_variations,
            },
            statistics: SummaryStatistics {
                room_count: area_findings.len(),
                reading_count: thermal_analysis.len(),
                recommendation_count: recommendations.len(),
                observation_count: frozen.observation_count(),
                suppressed_duplicate_count: frozen.suppressed_duplicates().len(),
            },
            area_findings,
            thermal_analysis,
            recommendations,
        };

        info!(
            rooms = report.statistics.room_count,
            readings = report.statistics.reading_count,
            "report rendered"
        );
        Ok(report)
    }

    fn to_markdown(&self, report: &DiagnosticReport) -> String {
        markdown::render(report)
    }
}

#[cfg(test)]
mod tests {
    use ddr_config::PipelineConfig;
    use ddr_contracts::{
        area::{CanonicalKey, RootCause},
        extraction::ExtractionResult,
        thermal::{AssessmentRule, ReadingUnits},
        validation::{InvariantCheck, InvariantClass, ValidationReport},
    };

    use super::*;

    // ── Builders ─────────────────────────────────────────────────────────────

    fn generator() -> TemplateReportGenerator {
        TemplateReportGenerator::new(PipelineConfig::builtin().unwrap().recommendations)
    }

    fn area(key: &str, display: &str, observations: &[&str]) -> ImpactedArea {
        ImpactedArea::with_observations(
            CanonicalKey::from_normalized(key),
            display,
            observations.iter().map(|o| o.to_string()),
        )
    }

    fn reading(id: &str, hot: Option<f64>, cold: Option<f64>, diff: Option<f64>) -> ThermalReading {
        ThermalReading::new(id, hot, cold, diff, ReadingUnits::uniform("°C"), 0, &AssessmentRule::default())
    }

    fn freeze(areas: Vec<ImpactedArea>, readings: Vec<ThermalReading>) -> FrozenExtraction {
        let rooms = areas.len();
        let locked = InvariantCheck::pass(InvariantClass::EntityCount, "room count locked").with_counts(rooms, rooms);
        FrozenExtraction::seal(
            ExtractionResult::from_raw(areas, readings, Vec::new()),
            &ValidationReport::single(locked),
        )
        .unwrap()
    }

    fn sample() -> FrozenExtraction {
        freeze(
            vec![
                area("hall", "Hall", &["Skirting level dampness", "Paint peeling"]),
                area("kitchen", "Kitchen", &["Seepage below sink"]),
                area("terrace", "Terrace", &["Debris on surface"]),
            ],
            vec![
                reading("IMG-001", Some(31.2), Some(24.1), Some(7.1)),
                reading("IMG-002", Some(27.0), Some(25.0), Some(2.0)),
            ],
        )
    }

    // ── Sections ─────────────────────────────────────────────────────────────

    #[test]
    fn executive_summary_restates_counts_and_first_observations() {
        let report = generator().render(&sample()).unwrap();
        let summary = &report.executive_summary;

        assert_eq!(summary.total_impacted_rooms, 3);
        assert_eq!(summary.thermal_images_analyzed, 2);
        assert_eq!(summary.significant_variations, 1);
        let bullets: Vec<(&str, &str)> = summary
            .critical_findings
            .iter()
            .map(|c| (c.room.as_str(), c.observation.as_str()))
            .collect();
        assert_eq!(
            bullets,
            [
                ("Hall", "Skirting level dampness"),
                ("Kitchen", "Seepage below sink"),
                ("Terrace", "Debris on surface"),
            ]
        );
    }

    #[test]
    fn area_findings_copy_observations_and_lock_root_cause() {
        let source = sample();
        let report = generator().render(&source).unwrap();

        assert_eq!(report.area_findings.len(), source.areas().len());
        for (finding, area) in report.area_findings.iter().zip(source.areas()) {
            assert_eq!(finding.observations.as_slice(), area.observations());
            assert_eq!(finding.root_cause, RootCause);
        }
        let indices: Vec<usize> = report.area_findings.iter().map(|f| f.index).collect();
        assert_eq!(indices, [1, 2, 3]);
    }

    #[test]
    fn recommendations_come_from_the_table_in_rule_order() {
        let report = generator().render(&sample()).unwrap();
        let categories: Vec<Option<&str>> = report
            .recommendations
            .iter()
            .map(|r| r.category.as_deref())
            .collect();
        // "Seepage below sink" hits the seepage rule; hall hits dampness; terrace has no keyword.
        assert_eq!(categories, [Some("dampness"), Some("seepage"), None]);

        let fallback = &PipelineConfig::builtin().unwrap().recommendations.fallback;
        assert_eq!(&report.recommendations[2].text, fallback);
        assert_eq!(report.area_findings[2].recommendation, *fallback);
    }

    #[test]
    fn statistics_are_pure_counts() {
        let report = generator().render(&sample()).unwrap();
        assert_eq!(
            report.statistics,
            SummaryStatistics {
                room_count: 3,
                reading_count: 2,
                recommendation_count: 3,
                observation_count: 4,
                suppressed_duplicate_count: 0,
            }
        );
    }

    // ── Incomplete data ──────────────────────────────────────────────────────

    #[test]
    fn missing_thermal_field_is_incomplete_data() {
        let frozen = freeze(
            vec![area("hall", "Hall", &["dampness"])],
            vec![reading("IMG-009", Some(30.0), None, Some(4.0))],
        );
        match generator().render(&frozen) {
            Err(DdrError::IncompleteData { section, entity, field }) => {
                assert_eq!(section, "Thermal Analysis");
                assert_eq!(entity, "IMG-009");
                assert_eq!(field, "coldspot_temp");
            }
            other => panic!("expected IncompleteData, got {other:?}"),
        }
    }

    #[test]
    fn area_without_observations_is_incomplete_data() {
        let frozen = freeze(vec![area("hall", "Hall", &[])], vec![]);
        match generator().render(&frozen) {
            Err(DdrError::IncompleteData { entity, field, .. }) => {
                assert_eq!(entity, "hall");
                assert_eq!(field, "observations");
            }
            other => panic!("expected IncompleteData, got {other:?}"),
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let source = sample();
        let g = generator();
        let a = g.render(&source).unwrap();
        let b = g.render(&source).unwrap();
        assert_eq!(a, b);
        assert_eq!(g.to_markdown(&a), g.to_markdown(&b));
    }
}
