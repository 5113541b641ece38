//! Top-level pipeline configuration and its loaders.
//!
//! `PipelineConfig` is parsed from TOML, validated once at load time, and then
//! handed by reference to every component that needs it. Nothing in it is
//! mutated after loading.
//!
//! Unknown keys are rejected at every level. In particular there is no key
//! for root cause: `root_cause = "..."` anywhere in the file is a parse error.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use ddr_contracts::{
    error::{DdrError, DdrResult},
    thermal::AssessmentRule,
};

use crate::{recommendation::RecommendationTable, rooms::RoomDictionary};

const BUILTIN_TOML: &str = include_str!("../../../config/default.toml");

/// Thermal assessment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThermalSettings {
    /// Differences strictly above this are significant variations.
    #[serde(default = "default_significant_difference")]
    pub significant_difference: f64,
}

impl ThermalSettings {
    pub fn assessment_rule(&self) -> AssessmentRule {
        AssessmentRule {
            significant_difference: self.significant_difference,
        }
    }
}

impl Default for ThermalSettings {
    fn default() -> Self {
        Self {
            significant_difference: default_significant_difference(),
        }
    }
}

fn default_significant_difference() -> f64 {
    AssessmentRule::default().significant_difference
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Limits {
    /// Upper bound on impacted areas in one report.
    #[serde(default = "default_max_areas")]
    pub max_areas: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_areas: default_max_areas(),
        }
    }
}

fn default_max_areas() -> usize {
    20
}

/// Substrings that mark a string as a thermal image identifier.
///
/// An area display name containing one of these was taken from the thermal
/// side and fails the cross-contamination check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Separation {
    #[serde(default = "default_image_id_markers")]
    pub image_id_markers: Vec<String>,
}

impl Default for Separation {
    fn default() -> Self {
        Self {
            image_id_markers: default_image_id_markers(),
        }
    }
}

fn default_image_id_markers() -> Vec<String> {
    [".jpg", ".jpeg", ".png", "rb0", "ir_"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineOptions {
    /// Run the two extractors on separate threads with a join barrier.
    #[serde(default = "default_parallel_extraction")]
    pub parallel_extraction: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            parallel_extraction: default_parallel_extraction(),
        }
    }
}

fn default_parallel_extraction() -> bool {
    true
}

/// The top-level structure deserialized from a pipeline configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub rooms: RoomDictionary,
    pub recommendations: RecommendationTable,

    #[serde(default)]
    pub thermal: ThermalSettings,

    #[serde(default)]
    pub limits: Limits,

    #[serde(default)]
    pub separation: Separation,

    #[serde(default)]
    pub pipeline: PipelineOptions,
}

impl PipelineConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `DdrError::Config` if the TOML is malformed, carries unknown
    /// keys, or fails validation.
    pub fn from_toml_str(s: &str) -> DdrResult<Self> {
        let config: PipelineConfig = toml::from_str(s).map_err(|e| DdrError::Config {
            reason: format!("failed to parse pipeline TOML: {}", e),
        })?;
        config.validate()?;
        debug!(
            rooms = config.rooms.entries.len(),
            nouns = config.rooms.nouns.len(),
            recommendation_rules = config.recommendations.rules.len(),
            "pipeline configuration loaded"
        );
        Ok(config)
    }

    /// Read the file at `path` and parse it as pipeline configuration.
    pub fn from_file(path: &Path) -> DdrResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| DdrError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The configuration shipped with the crate (`config/default.toml`).
    pub fn builtin() -> DdrResult<Self> {
        Self::from_toml_str(BUILTIN_TOML)
    }

    /// `from_file` when a path is given, `builtin` otherwise.
    pub fn load(path: Option<&Path>) -> DdrResult<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Self::builtin(),
        }
    }

    pub fn validate(&self) -> DdrResult<()> {
        self.rooms.validate()?;
        self.recommendations.validate()?;

        if !self.thermal.significant_difference.is_finite() {
            return Err(DdrError::Config {
                reason: format!(
                    "thermal.significant_difference must be finite, got {}",
                    self.thermal.significant_difference
                ),
            });
        }
        if self.limits.max_areas == 0 {
            return Err(DdrError::Config {
                reason: "limits.max_areas must be at least 1".to_string(),
            });
        }
        if let Some(marker) = self.separation.image_id_markers.iter().find(|m| m.is_empty()) {
            return Err(DdrError::Config {
                reason: format!("separation.image_id_markers contains an empty marker {:?}", marker),
            });
        }
        Ok(())
    }
}
