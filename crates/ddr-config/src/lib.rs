//! # ddr-config
//!
//! TOML-driven, immutable configuration for the diagnostic report pipeline.
//!
//! ## Overview
//!
//! [`PipelineConfig`] holds the static inputs the pipeline treats as data
//! rather than logic: the canonical room dictionary, the recommendation
//! lookup table, the thermal assessment threshold, the area ceiling and the
//! image-ID markers used by the separation check. It is loaded once and
//! passed explicitly to each component at construction.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use ddr_config::PipelineConfig;
//!
//! let config = PipelineConfig::from_file(Path::new("config/default.toml"))?;
//! // or: PipelineConfig::builtin()?
//! ```

pub mod config;
pub mod recommendation;
pub mod rooms;

pub use config::{Limits, PipelineConfig, PipelineOptions, Separation, ThermalSettings};
pub use recommendation::{RecommendationRule, RecommendationTable};
pub use rooms::{slug, RoomDictionary, RoomEntry};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use ddr_contracts::error::DdrError;

    use crate::PipelineConfig;

    const MINIMAL: &str = r#"
        [rooms]
        nouns = ["hall"]

        [recommendations]
        fallback = "inspect on site"
    "#;

    // ── 1. built-in configuration ────────────────────────────────────────────

    #[test]
    fn test_builtin_config_loads_and_validates() {
        let config = PipelineConfig::builtin().unwrap();

        assert!(!config.rooms.entries.is_empty());
        assert!(!config.recommendations.rules.is_empty());
        assert_eq!(config.limits.max_areas, 20);
        assert_eq!(config.thermal.significant_difference, 4.0);
        assert!(config.separation.image_id_markers.iter().any(|m| m == ".jpg"));

        let table = config.rooms.lookup_table();
        assert_eq!(table.get("bed room 1").map(String::as_str), Some("bedroom 1"));
        assert_eq!(table.get("mb bathroom").map(String::as_str), Some("master bathroom"));
    }

    // ── 2. defaults for optional sections ────────────────────────────────────

    #[test]
    fn test_optional_sections_default() {
        let config = PipelineConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.limits.max_areas, 20);
        assert_eq!(config.thermal.assessment_rule().significant_difference, 4.0);
        assert!(config.pipeline.parallel_extraction);
        assert_eq!(config.separation.image_id_markers.len(), 5);
    }

    // ── 3. root cause cannot be configured ───────────────────────────────────

    #[test]
    fn test_root_cause_key_is_rejected() {
        let toml = format!("root_cause = \"Rising damp\"\n{MINIMAL}");

        match PipelineConfig::from_toml_str(&toml) {
            Err(DdrError::Config { reason }) => {
                assert!(reason.contains("root_cause"), "unexpected reason: {reason}");
            }
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_nested_key_is_rejected() {
        let toml = r#"
            [rooms]
            nouns = ["hall"]

            [recommendations]
            fallback = "inspect on site"
            root_cause = "Plumbing"
        "#;

        assert!(matches!(
            PipelineConfig::from_toml_str(toml),
            Err(DdrError::Config { .. })
        ));
    }

    // ── 4. value validation ──────────────────────────────────────────────────

    #[test]
    fn test_zero_max_areas_is_rejected() {
        let toml = format!("{MINIMAL}\n[limits]\nmax_areas = 0\n");

        match PipelineConfig::from_toml_str(&toml) {
            Err(DdrError::Config { reason }) => assert!(reason.contains("max_areas")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_threshold_is_rejected() {
        let toml = format!("{MINIMAL}\n[thermal]\nsignificant_difference = nan\n");

        match PipelineConfig::from_toml_str(&toml) {
            Err(DdrError::Config { reason }) => assert!(reason.contains("finite")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_conflicting_synonyms_fail_at_load() {
        let toml = r#"
            [[rooms.entries]]
            canonical = "master bedroom"
            synonyms = ["MB"]

            [[rooms.entries]]
            canonical = "master bathroom"
            synonyms = ["mb"]

            [recommendations]
            fallback = "inspect on site"
        "#;

        assert!(matches!(
            PipelineConfig::from_toml_str(toml),
            Err(DdrError::Config { .. })
        ));
    }

    // ── 5. parse and read errors ─────────────────────────────────────────────

    #[test]
    fn test_toml_parse_error() {
        let result = PipelineConfig::from_toml_str("this is not valid toml ][[[");

        match result {
            Err(DdrError::Config { reason }) => {
                assert!(
                    reason.contains("failed to parse pipeline TOML"),
                    "expected parse error message, got: {reason}"
                );
            }
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let path = std::path::Path::new("/nonexistent/ddr/pipeline.toml");

        match PipelineConfig::from_file(path) {
            Err(DdrError::Config { reason }) => assert!(reason.contains("failed to read config file")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }
}
