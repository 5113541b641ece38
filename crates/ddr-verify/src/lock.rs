//! The entity lock.
//!
//! `EntityLock` implements [`EntityGate`]: it consolidates areas under the
//! keys extraction already produced, pins the room set to the independent
//! mention count, runs the second thermal uniqueness pass, and checks that
//! room names and image IDs stayed on their own side.
//!
//! Nothing here creates an entity. Every check that cannot hold reports the
//! identifiers responsible instead of repairing them.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use ddr_config::PipelineConfig;
use ddr_contracts::{
    area::CanonicalKey,
    error::{DdrError, DdrResult},
    extraction::ExtractionResult,
    thermal::{DuplicateRecord, ThermalReading},
    validation::{ExpectedRooms, InvariantCheck, InvariantClass},
};
use ddr_core::traits::EntityGate;
use ddr_extract::RoomCanonicalizer;

pub struct EntityLock {
    canonicalizer: RoomCanonicalizer,
    /// Lowercased image-ID markers.
    markers: Vec<String>,
    max_areas: usize,
}

impl EntityLock {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            canonicalizer: RoomCanonicalizer::new(&config.rooms),
            markers: config
                .separation
                .image_id_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
            max_areas: config.limits.max_areas,
        }
    }

    fn key_set(result: &ExtractionResult) -> BTreeSet<CanonicalKey> {
        result.areas().iter().map(|a| a.canonical_room_key.clone()).collect()
    }
}

/// Keys present in exactly one of the two sets, as strings.
fn symmetric_difference<'a>(
    a: impl IntoIterator<Item = &'a CanonicalKey>,
    b: impl IntoIterator<Item = &'a CanonicalKey>,
) -> Vec<String> {
    let a: BTreeSet<&CanonicalKey> = a.into_iter().collect();
    let b: BTreeSet<&CanonicalKey> = b.into_iter().collect();
    a.symmetric_difference(&b).map(|k| k.as_str().to_string()).collect()
}

impl EntityGate for EntityLock {
    fn normalize(&self, result: &mut ExtractionResult) -> DdrResult<InvariantCheck> {
        let before = Self::key_set(result);
        let entries = result.areas().len();
        let folded = result.merge_by_key();

        for area in result.areas() {
            let key = self.canonicalizer.canonicalize(&area.display_name);
            if key != area.canonical_room_key {
                warn!(
                    room = %area.canonical_room_key,
                    display = %area.display_name,
                    recomputed = %key,
                    "display name does not canonicalize to its key"
                );
                return Err(DdrError::StructuralIntegrity {
                    reason: format!(
                        "display name '{}' canonicalizes to '{}', not to its stored key '{}'",
                        area.display_name, key, area.canonical_room_key
                    ),
                    offending: vec![area.canonical_room_key.as_str().to_string()],
                });
            }
        }

        let after = Self::key_set(result);
        if after != before {
            return Err(DdrError::StructuralIntegrity {
                reason: "normalization changed the set of room keys".to_string(),
                offending: symmetric_difference(&before, &after),
            });
        }

        debug!(areas = after.len(), folded, "areas normalized");
        Ok(InvariantCheck::pass(
            InvariantClass::Normalization,
            format!("{} areas, {} entries merged under existing keys", after.len(), folded),
        )
        .with_counts(entries, result.areas().len()))
    }

    fn lock_entity_count(&self, result: &ExtractionResult, expected: &ExpectedRooms) -> InvariantCheck {
        let extracted = Self::key_set(result);
        let actual = result.areas().len();
        let offending = symmetric_difference(&extracted, expected.keys());

        if offending.is_empty() && actual == expected.count() {
            InvariantCheck::pass(
                InvariantClass::EntityCount,
                format!("{actual} rooms extracted, {} counted", expected.count()),
            )
            .with_counts(expected.count(), actual)
        } else {
            warn!(expected = expected.count(), actual, offending = ?offending, "entity count mismatch");
            InvariantCheck::fail(
                InvariantClass::EntityCount,
                offending.clone(),
                format!(
                    "extracted {actual} rooms but counted {}; rooms on one side only: {}",
                    expected.count(),
                    offending.join(", ")
                ),
            )
            .with_counts(expected.count(), actual)
        }
    }

    fn deduplicate_thermal(&self, readings: &[ThermalReading]) -> (Vec<ThermalReading>, Vec<DuplicateRecord>) {
        let mut seen: HashMap<&str, (usize, usize)> = HashMap::new();
        let mut unique = Vec::with_capacity(readings.len());
        let mut duplicates = Vec::new();

        for reading in readings {
            match seen.get_mut(reading.image_id.as_str()) {
                Some((kept_offset, sightings)) => {
                    *sightings += 1;
                    duplicates.push(DuplicateRecord {
                        image_id: reading.image_id.clone(),
                        occurrence: *sightings,
                        kept_offset: *kept_offset,
                        dropped_offset: reading.source_offset,
                        suppressed: reading.clone(),
                    });
                }
                None => {
                    seen.insert(reading.image_id.as_str(), (reading.source_offset, 1));
                    unique.push(reading.clone());
                }
            }
        }

        if !duplicates.is_empty() {
            warn!(duplicates = duplicates.len(), "duplicate image ids reached validation");
        }
        (unique, duplicates)
    }

    fn check_separation(&self, result: &ExtractionResult) -> InvariantCheck {
        let mut offending = Vec::new();

        for area in result.areas() {
            let lowered = area.display_name.to_lowercase();
            if self.markers.iter().any(|m| lowered.contains(m.as_str())) {
                offending.push(area.display_name.clone());
            }
        }

        let keys = Self::key_set(result);
        for reading in result.readings() {
            if keys.contains(&self.canonicalizer.canonicalize(&reading.image_id)) {
                offending.push(reading.image_id.clone());
            }
        }

        if offending.is_empty() {
            InvariantCheck::pass(
                InvariantClass::CrossContamination,
                "room names and image ids are disjoint",
            )
        } else {
            warn!(offending = ?offending, "room names and image ids overlap");
            InvariantCheck::fail(
                InvariantClass::CrossContamination,
                offending.clone(),
                format!("identifiers found on the wrong side: {}", offending.join(", ")),
            )
        }
    }

    fn check_area_limit(&self, result: &ExtractionResult) -> InvariantCheck {
        let actual = result.areas().len();
        if actual <= self.max_areas {
            InvariantCheck::pass(
                InvariantClass::AreaLimit,
                format!("{actual} areas within the limit of {}", self.max_areas),
            )
            .with_counts(self.max_areas, actual)
        } else {
            let over: Vec<String> = result.areas()[self.max_areas..]
                .iter()
                .map(|a| a.canonical_room_key.as_str().to_string())
                .collect();
            InvariantCheck::fail(
                InvariantClass::AreaLimit,
                over,
                format!("{actual} areas exceed the limit of {}", self.max_areas),
            )
            .with_counts(self.max_areas, actual)
        }
    }
}
