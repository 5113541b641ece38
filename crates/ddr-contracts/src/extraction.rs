//! Extraction results and their lifecycle.
//!
//! ```text
//! InspectionExtraction ─┐
//!                       ├─> ExtractionResult ──(normalize, lock)──> FrozenExtraction
//! ThermalExtraction ────┘        merge-only                         read-only
//! ```
//!
//! Areas can only be created while an `InspectionExtraction` is being built.
//! Once the two halves are joined into an `ExtractionResult`, the API offers
//! merge operations only, and `FrozenExtraction` offers none at all.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    area::{CanonicalKey, ImpactedArea},
    error::{DdrError, DdrResult},
    thermal::{DuplicateRecord, ThermalReading},
    validation::{InvariantClass, ValidationReport},
};

/// Which input document a message or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    Inspection,
    Thermal,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Inspection => f.write_str("inspection"),
            DocumentKind::Thermal => f.write_str("thermal"),
        }
    }
}

/// The two plain-text inputs, already extracted from PDF by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocuments {
    pub inspection: String,
    pub thermal: String,
}

impl SourceDocuments {
    pub fn new(inspection: impl Into<String>, thermal: impl Into<String>) -> Self {
        Self {
            inspection: inspection.into(),
            thermal: thermal.into(),
        }
    }
}

/// Whether `InspectionExtraction::record` created an area, extended one, or
/// dropped a byte-identical observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Created,
    Appended,
    DuplicateObservation,
}

/// Inspection-side output under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectionExtraction {
    areas: Vec<ImpactedArea>,
    index: HashMap<CanonicalKey, usize>,
}

impl InspectionExtraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one (room, observation) match.
    ///
    /// The first mention of a key creates the area and fixes its display name;
    /// later mentions only append observations that are not already present.
    pub fn record(&mut self, key: CanonicalKey, display_name: &str, observation: &str) -> RecordOutcome {
        if let Some(&idx) = self.index.get(&key) {
            if self.areas[idx].push_observation(observation) {
                RecordOutcome::Appended
            } else {
                RecordOutcome::DuplicateObservation
            }
        } else {
            self.index.insert(key.clone(), self.areas.len());
            self.areas.push(ImpactedArea::new(key, display_name, observation));
            RecordOutcome::Created
        }
    }

    pub fn areas(&self) -> &[ImpactedArea] {
        &self.areas
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

/// Thermal-side output: unique readings plus the audit list of dropped duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThermalExtraction {
    pub readings: Vec<ThermalReading>,
    pub duplicates: Vec<DuplicateRecord>,
}

/// Joined extractor output, owned by a single pipeline run.
///
/// Mutable only through merge-only operations used by the normalization stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    areas: Vec<ImpactedArea>,
    readings: Vec<ThermalReading>,
    suppressed_duplicates: Vec<DuplicateRecord>,
}

impl ExtractionResult {
    /// Join the two extractor outputs. Area order is first-seen source order.
    pub fn from_parts(inspection: InspectionExtraction, thermal: ThermalExtraction) -> Self {
        Self {
            areas: inspection.areas,
            readings: thermal.readings,
            suppressed_duplicates: thermal.duplicates,
        }
    }

    /// Assemble a result from already-built parts, e.g. a deserialized payload.
    ///
    /// Nothing is merged or checked here; the normalization stage does that.
    pub fn from_raw(
        areas: Vec<ImpactedArea>,
        readings: Vec<ThermalReading>,
        suppressed_duplicates: Vec<DuplicateRecord>,
    ) -> Self {
        Self {
            areas,
            readings,
            suppressed_duplicates,
        }
    }

    pub fn areas(&self) -> &[ImpactedArea] {
        &self.areas
    }

    pub fn readings(&self) -> &[ThermalReading] {
        &self.readings
    }

    pub fn suppressed_duplicates(&self) -> &[DuplicateRecord] {
        &self.suppressed_duplicates
    }

    /// Consolidate areas sharing a canonical key into the first one.
    ///
    /// Observation lists are concatenated in order with exact-match dedup; the
    /// first area's display name wins. Never creates a key. Returns the number
    /// of areas folded away.
    pub fn merge_by_key(&mut self) -> usize {
        let before = self.areas.len();
        let mut merged: Vec<ImpactedArea> = Vec::with_capacity(before);
        let mut index: HashMap<CanonicalKey, usize> = HashMap::new();

        for area in std::mem::take(&mut self.areas) {
            match index.get(&area.canonical_room_key) {
                Some(&idx) => {
                    for obs in area.observations() {
                        merged[idx].push_observation(obs.as_str());
                    }
                }
                None => {
                    index.insert(area.canonical_room_key.clone(), merged.len());
                    // Rebuild so duplicates inside a single area are dropped too.
                    merged.push(ImpactedArea::with_observations(
                        area.canonical_room_key.clone(),
                        area.display_name.clone(),
                        area.observations().iter().cloned(),
                    ));
                }
            }
        }

        self.areas = merged;
        before - self.areas.len()
    }

    /// Replace the reading list with a deduplicated subset of itself.
    ///
    /// Rejects any reading whose image ID was not already present, so the
    /// thermal side cannot gain entities either.
    pub fn retain_readings(&mut self, unique: Vec<ThermalReading>) -> DdrResult<()> {
        for reading in &unique {
            if !self.readings.iter().any(|r| r.image_id == reading.image_id) {
                return Err(DdrError::StructuralIntegrity {
                    reason: format!(
                        "thermal reading '{}' was not produced by extraction",
                        reading.image_id
                    ),
                    offending: vec![reading.image_id.clone()],
                });
            }
        }
        self.readings = unique;
        Ok(())
    }
}

/// Immutable, validated extraction result. The report generator's only input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrozenExtraction {
    areas: Vec<ImpactedArea>,
    readings: Vec<ThermalReading>,
    suppressed_duplicates: Vec<DuplicateRecord>,
}

impl FrozenExtraction {
    /// Freeze `result`, provided `validation` passed and includes a passing
    /// entity-count lock.
    pub fn seal(result: ExtractionResult, validation: &ValidationReport) -> DdrResult<Self> {
        if !validation.passed() {
            return Err(DdrError::StructuralIntegrity {
                reason: format!(
                    "cannot freeze an extraction result with failed checks: {}",
                    validation.failure_summary()
                ),
                offending: validation.offending_identifiers(),
            });
        }
        if validation.check(InvariantClass::EntityCount).is_none() {
            return Err(DdrError::StructuralIntegrity {
                reason: "cannot freeze an extraction result without an entity-count check".to_string(),
                offending: Vec::new(),
            });
        }
        Ok(Self {
            areas: result.areas,
            readings: result.readings,
            suppressed_duplicates: result.suppressed_duplicates,
        })
    }

    pub fn areas(&self) -> &[ImpactedArea] {
        &self.areas
    }

    pub fn readings(&self) -> &[ThermalReading] {
        &self.readings
    }

    pub fn suppressed_duplicates(&self) -> &[DuplicateRecord] {
        &self.suppressed_duplicates
    }

    pub fn observation_count(&self) -> usize {
        self.areas.iter().map(|a| a.observations().len()).sum()
    }
}
