//! # ddr-contracts
//!
//! Shared types, invariants, and error contracts for the detailed diagnostic
//! report pipeline.
//!
//! All crates in the workspace import from here. The only logic in this crate
//! is what the types need to keep their own invariants: exact-match
//! observation dedup, merge-only consolidation, and the sealed frozen result.

pub mod area;
pub mod error;
pub mod execution;
pub mod extraction;
pub mod report;
pub mod thermal;
pub mod validation;

#[cfg(test)]
mod tests {
    use super::*;
    use area::{CanonicalKey, ImpactedArea, RootCause};
    use error::DdrError;
    use extraction::{
        DocumentKind, ExtractionResult, FrozenExtraction, InspectionExtraction, RecordOutcome,
        ThermalExtraction,
    };
    use thermal::{AssessmentRule, ReadingUnits, ThermalAssessment, ThermalReading};
    use validation::{InvariantCheck, InvariantClass, ValidationReport};

    fn key(s: &str) -> CanonicalKey {
        CanonicalKey::from_normalized(s)
    }

    fn reading(id: &str, hot: f64, cold: f64, diff: f64) -> ThermalReading {
        ThermalReading::new(
            id,
            Some(hot),
            Some(cold),
            Some(diff),
            ReadingUnits::uniform("°C"),
            0,
            &AssessmentRule::default(),
        )
    }

    // ── InspectionExtraction ─────────────────────────────────────────────────

    #[test]
    fn record_creates_then_appends_then_drops_exact_duplicates() {
        let mut ext = InspectionExtraction::new();

        assert_eq!(
            ext.record(key("bedroom 1"), "Bedroom 1", "Dampness at skirting"),
            RecordOutcome::Created
        );
        assert_eq!(
            ext.record(key("bedroom 1"), "BEDROOM 1", "Paint peeling"),
            RecordOutcome::Appended
        );
        assert_eq!(
            ext.record(key("bedroom 1"), "bedroom 1", "Dampness at skirting"),
            RecordOutcome::DuplicateObservation
        );

        assert_eq!(ext.areas().len(), 1);
        let area = &ext.areas()[0];
        // First occurrence fixes the display name.
        assert_eq!(area.display_name, "Bedroom 1");
        assert_eq!(area.observations(), ["Dampness at skirting", "Paint peeling"]);
    }

    #[test]
    fn observation_dedup_is_exact_not_case_insensitive() {
        let mut area = ImpactedArea::new(key("hall"), "Hall", "Dampness");
        assert!(area.push_observation("dampness"));
        assert!(area.push_observation("Dampness "));
        assert!(!area.push_observation("Dampness"));
        assert_eq!(area.observations().len(), 3);
    }

    // ── RootCause lock ───────────────────────────────────────────────────────

    #[test]
    fn root_cause_serializes_as_not_available() {
        let area = ImpactedArea::new(key("kitchen"), "Kitchen", "Seepage");
        let json = serde_json::to_value(&area).unwrap();
        assert_eq!(json["root_cause"], "Not Available");
        assert_eq!(RootCause.to_string(), RootCause::TEXT);
    }

    #[test]
    fn root_cause_refuses_any_other_value() {
        let payload = serde_json::json!({
            "canonical_room_key": "kitchen",
            "display_name": "Kitchen",
            "observations": ["Seepage"],
            "root_cause": "Plumbing leak"
        });
        let err = serde_json::from_value::<ImpactedArea>(payload).unwrap_err();
        assert!(err.to_string().contains("locked"), "unexpected error: {err}");
    }

    #[test]
    fn root_cause_defaults_when_absent() {
        let payload = serde_json::json!({
            "canonical_room_key": "kitchen",
            "display_name": "Kitchen",
            "observations": ["Seepage"]
        });
        let area: ImpactedArea = serde_json::from_value(payload).unwrap();
        assert_eq!(area.root_cause, RootCause);
    }

    // ── Thermal assessment ───────────────────────────────────────────────────

    #[test]
    fn assessment_threshold_is_strictly_greater_than() {
        let rule = AssessmentRule::default();
        assert_eq!(rule.assess(4.0), ThermalAssessment::NormalRange);
        assert_eq!(rule.assess(4.1), ThermalAssessment::SignificantVariation);
        assert_eq!(rule.assess(-6.0), ThermalAssessment::NormalRange);
    }

    #[test]
    fn assessment_absent_when_any_field_missing() {
        let rule = AssessmentRule::default();
        let r = ThermalReading::new("IMG-1", Some(30.0), None, Some(6.0), ReadingUnits::default(), 0, &rule);
        assert!(r.assessment.is_none());

        let r = reading("IMG-2", 30.0, 24.0, 6.0);
        assert_eq!(r.assessment, Some(ThermalAssessment::SignificantVariation));
    }

    // ── ExtractionResult merge-only operations ───────────────────────────────

    #[test]
    fn merge_by_key_consolidates_without_creating_keys() {
        let areas = vec![
            ImpactedArea::new(key("hall"), "Hall", "Skirting dampness"),
            ImpactedArea::new(key("kitchen"), "Kitchen", "Sink seepage"),
            ImpactedArea::with_observations(
                key("hall"),
                "HALL",
                vec!["Skirting dampness".to_string(), "Ceiling stain".to_string()],
            ),
        ];
        let mut result = ExtractionResult::from_raw(areas, vec![], vec![]);

        let folded = result.merge_by_key();

        assert_eq!(folded, 1);
        assert_eq!(result.areas().len(), 2);
        assert_eq!(result.areas()[0].display_name, "Hall");
        assert_eq!(
            result.areas()[0].observations(),
            ["Skirting dampness", "Ceiling stain"]
        );
        assert_eq!(result.areas()[1].canonical_room_key, key("kitchen"));
    }

    #[test]
    fn retain_readings_rejects_unknown_image_ids() {
        let thermal = ThermalExtraction {
            readings: vec![reading("IMG-1", 30.0, 25.0, 5.0)],
            duplicates: vec![],
        };
        let mut result = ExtractionResult::from_parts(InspectionExtraction::new(), thermal);

        let err = result
            .retain_readings(vec![reading("IMG-9", 30.0, 25.0, 5.0)])
            .unwrap_err();
        match err {
            DdrError::StructuralIntegrity { offending, .. } => assert_eq!(offending, ["IMG-9"]),
            other => panic!("expected StructuralIntegrity, got {other:?}"),
        }
        assert_eq!(result.readings().len(), 1);
    }

    // ── FrozenExtraction ─────────────────────────────────────────────────────

    #[test]
    fn seal_refuses_failed_validation() {
        let mut report = ValidationReport::default();
        report.record(
            InvariantCheck::fail(
                InvariantClass::EntityCount,
                vec!["hall".to_string()],
                "expected 2 rooms, extracted 1",
            )
            .with_counts(2, 1),
        );

        let err = FrozenExtraction::seal(ExtractionResult::default(), &report).unwrap_err();
        match err {
            DdrError::StructuralIntegrity { reason, offending } => {
                assert!(reason.contains("entity-count"), "reason: {reason}");
                assert_eq!(offending, ["hall"]);
            }
            other => panic!("expected StructuralIntegrity, got {other:?}"),
        }
    }

    #[test]
    fn seal_accepts_passing_validation() {
        let mut ext = InspectionExtraction::new();
        ext.record(key("hall"), "Hall", "Dampness");
        let result = ExtractionResult::from_parts(ext, ThermalExtraction::default());
        let report = ValidationReport::single(InvariantCheck::pass(InvariantClass::EntityCount, "ok"));

        let frozen = FrozenExtraction::seal(result, &report).unwrap();
        assert_eq!(frozen.areas().len(), 1);
        assert_eq!(frozen.observation_count(), 1);
    }

    #[test]
    fn seal_refuses_an_empty_report() {
        let err = FrozenExtraction::seal(ExtractionResult::default(), &ValidationReport::default()).unwrap_err();
        match err {
            DdrError::StructuralIntegrity { reason, .. } => {
                assert!(reason.contains("no validation checks were recorded"), "reason: {reason}")
            }
            other => panic!("expected StructuralIntegrity, got {other:?}"),
        }
    }

    #[test]
    fn seal_requires_the_entity_count_lock() {
        let mut report = ValidationReport::single(InvariantCheck::pass(InvariantClass::Normalization, "ok"));
        report.record(InvariantCheck::pass(InvariantClass::AreaLimit, "ok"));
        assert!(report.passed());

        let err = FrozenExtraction::seal(ExtractionResult::default(), &report).unwrap_err();
        match err {
            DdrError::StructuralIntegrity { reason, .. } => assert!(reason.contains("entity-count"), "reason: {reason}"),
            other => panic!("expected StructuralIntegrity, got {other:?}"),
        }
    }

    // ── ValidationReport ─────────────────────────────────────────────────────

    #[test]
    fn validation_report_passes_only_if_every_check_passes() {
        let mut report = ValidationReport::default();
        assert!(!report.passed(), "an empty report has checked nothing");

        report.record(InvariantCheck::pass(InvariantClass::Normalization, "ok"));
        assert!(report.passed());

        let mut other = ValidationReport::default();
        other.record(InvariantCheck::fail(
            InvariantClass::CrossContamination,
            vec!["IMG-1.jpg".to_string()],
            "image id used as a room",
        ));
        report.absorb(other);

        assert!(!report.passed());
        assert_eq!(report.failures().count(), 1);
        assert!(report.check(InvariantClass::CrossContamination).is_some());
        assert!(report.failure_summary().starts_with("[cross-contamination]"));
    }

    #[test]
    fn rejection_error_prefers_duplicate_entity() {
        let dropped = reading("IMG-004", 31.0, 24.0, 7.0);
        let mut report = ValidationReport::default();
        report.record(InvariantCheck::fail(
            InvariantClass::DuplicateThermalIds,
            vec!["IMG-004".to_string()],
            "image id 'IMG-004' appears 2 times",
        ));
        report.reject_duplicates(vec![thermal::DuplicateRecord {
            image_id: "IMG-004".to_string(),
            occurrence: 2,
            kept_offset: 0,
            dropped_offset: 120,
            suppressed: dropped,
        }]);

        match report.rejection_error() {
            Some(DdrError::DuplicateEntity { image_id, occurrences }) => {
                assert_eq!(image_id, "IMG-004");
                assert_eq!(occurrences, 2);
            }
            other => panic!("expected DuplicateEntity, got {other:?}"),
        }
        let passing = ValidationReport::single(InvariantCheck::pass(InvariantClass::EntityCount, "ok"));
        assert!(passing.rejection_error().is_none());
    }

    #[test]
    fn rejected_duplicate_fails_a_report_whose_checks_passed() {
        let mut report = ValidationReport::single(InvariantCheck::pass(InvariantClass::EntityCount, "ok"));
        report.reject_duplicates(vec![thermal::DuplicateRecord {
            image_id: "IMG-004".to_string(),
            occurrence: 2,
            kept_offset: 0,
            dropped_offset: 120,
            suppressed: reading("IMG-004", 31.0, 24.0, 7.0),
        }]);
        assert!(!report.passed());
        assert!(FrozenExtraction::seal(ExtractionResult::default(), &report).is_err());
    }

    #[test]
    fn serialized_report_carries_the_derived_verdict() {
        let mut report = ValidationReport::single(InvariantCheck::pass(InvariantClass::EntityCount, "ok"));
        assert_eq!(serde_json::to_value(&report).unwrap()["passed"], true);
        report.record(InvariantCheck::fail(InvariantClass::AreaLimit, vec!["terrace".to_string()], "too many"));
        assert_eq!(serde_json::to_value(&report).unwrap()["passed"], false);
    }

    #[test]
    fn expected_rooms_counts_distinct_keys() {
        let expected = validation::ExpectedRooms::from_keys(vec![key("hall"), key("kitchen"), key("hall")]);
        assert_eq!(expected.count(), 2);
        assert!(expected.contains(&key("kitchen")));
    }

    // ── DdrError display messages ────────────────────────────────────────────

    #[test]
    fn error_messages_name_the_offender() {
        let err = DdrError::NumericParse {
            image_id: "IMG-004".to_string(),
            field: "hotspot".to_string(),
            raw: "hot".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("IMG-004") && msg.contains("hotspot") && msg.contains("'hot'"));

        let err = DdrError::Extraction {
            document: DocumentKind::Inspection,
            reason: "no recognizable room mentions".to_string(),
        };
        assert!(err.to_string().starts_with("inspection extraction failed"));

        let err = DdrError::IncompleteData {
            section: "Thermal Analysis".to_string(),
            entity: "IMG-7".to_string(),
            field: "coldspot_temp".to_string(),
        };
        assert!(err.to_string().contains("coldspot_temp"));

        let err = DdrError::DuplicateEntity {
            image_id: "IMG-004".to_string(),
            occurrences: 2,
        };
        assert!(err.to_string().contains("IMG-004"));
    }
}
