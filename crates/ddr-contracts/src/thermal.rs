//! Thermal-side types.
//!
//! A `ThermalReading` is keyed by the image ID printed in the thermal report.
//! Readings never reference rooms; the two sides of the pipeline only meet in
//! the validation stage, which checks that they stay separate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed label derived from the temperature difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThermalAssessment {
    SignificantVariation,
    NormalRange,
}

impl ThermalAssessment {
    pub fn label(&self) -> &'static str {
        match self {
            ThermalAssessment::SignificantVariation => "Significant temperature variation",
            ThermalAssessment::NormalRange => "Normal range",
        }
    }
}

impl fmt::Display for ThermalAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The only rule allowed to produce a `ThermalAssessment`.
///
/// A difference strictly greater than `significant_difference` is a
/// significant variation; anything else is normal range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRule {
    pub significant_difference: f64,
}

impl AssessmentRule {
    pub fn assess(&self, temp_difference: f64) -> ThermalAssessment {
        if temp_difference > self.significant_difference {
            ThermalAssessment::SignificantVariation
        } else {
            ThermalAssessment::NormalRange
        }
    }
}

impl Default for AssessmentRule {
    fn default() -> Self {
        Self { significant_difference: 4.0 }
    }
}

/// Unit text printed next to each value, kept per field.
///
/// A field printed without a unit has `None` here even when its neighbours
/// carry one; units are never copied from one field to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingUnits {
    pub hotspot: Option<String>,
    pub coldspot: Option<String>,
    pub difference: Option<String>,
}

impl ReadingUnits {
    /// The same printed unit on all three fields.
    pub fn uniform(unit: impl Into<String>) -> Self {
        let unit = unit.into();
        Self {
            hotspot: Some(unit.clone()),
            coldspot: Some(unit.clone()),
            difference: Some(unit),
        }
    }
}

/// One thermal image's parsed temperatures.
///
/// Numeric fields are `None` when the block did not carry that field; they are
/// never estimated. `assessment` is present only when all three are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalReading {
    pub image_id: String,
    pub hotspot_temp: Option<f64>,
    pub coldspot_temp: Option<f64>,
    pub temp_difference: Option<f64>,
    /// Unit text exactly as printed next to each value (e.g. `°C`).
    pub units: ReadingUnits,
    pub assessment: Option<ThermalAssessment>,
    /// Byte offset of the image-ID line in the source text.
    pub source_offset: usize,
}

impl ThermalReading {
    /// Build a reading, deriving `assessment` with `rule`.
    pub fn new(
        image_id: impl Into<String>,
        hotspot_temp: Option<f64>,
        coldspot_temp: Option<f64>,
        temp_difference: Option<f64>,
        units: ReadingUnits,
        source_offset: usize,
        rule: &AssessmentRule,
    ) -> Self {
        let assessment = match (hotspot_temp, coldspot_temp, temp_difference) {
            (Some(_), Some(_), Some(diff)) => Some(rule.assess(diff)),
            _ => None,
        };
        Self {
            image_id: image_id.into(),
            hotspot_temp,
            coldspot_temp,
            temp_difference,
            units,
            assessment,
            source_offset,
        }
    }
}

/// Audit entry for a thermal block dropped because its image ID was already seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateRecord {
    pub image_id: String,
    /// 2 for the second sighting, 3 for the third, and so on.
    pub occurrence: usize,
    pub kept_offset: usize,
    pub dropped_offset: usize,
    pub suppressed: ThermalReading,
}
