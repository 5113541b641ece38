//! Thermal-text extractor.
//!
//! Every image-ID line opens a block; the hotspot, coldspot and difference
//! lines that follow belong to it until the next image ID. Values must satisfy
//! the strict numeric grammar and be finite or extraction fails. Absent fields
//! stay `None`, and each value keeps only the unit printed beside it.
//!
//! All blocks are parsed before deduplication: the first block of an image ID
//! is kept and later ones go to the audit list.

use std::collections::HashMap;

use tracing::{debug, warn};

use ddr_contracts::{
    error::{DdrError, DdrResult},
    extraction::{DocumentKind, ThermalExtraction},
    thermal::{AssessmentRule, DuplicateRecord, ReadingUnits, ThermalReading},
};
use ddr_core::traits::ThermalScanner;

use crate::rules::{ThermalField, NUMERIC_VALUE, THERMAL_RULES};

/// A parsed numeric field: the value and its unit text, if printed.
type Measured<'t> = (f64, Option<&'t str>);

#[derive(Debug)]
struct Block<'t> {
    image_id: &'t str,
    offset: usize,
    hotspot: Option<Measured<'t>>,
    coldspot: Option<Measured<'t>>,
    difference: Option<Measured<'t>>,
}

impl<'t> Block<'t> {
    fn new(image_id: &'t str, offset: usize) -> Self {
        Self {
            image_id,
            offset,
            hotspot: None,
            coldspot: None,
            difference: None,
        }
    }

    fn slot(&mut self, field: ThermalField) -> Option<&mut Option<Measured<'t>>> {
        match field {
            ThermalField::Hotspot => Some(&mut self.hotspot),
            ThermalField::Coldspot => Some(&mut self.coldspot),
            ThermalField::Difference => Some(&mut self.difference),
            ThermalField::ImageId => None,
        }
    }

    fn into_reading(self, rule: &AssessmentRule) -> ThermalReading {
        let unit = |m: Option<Measured<'t>>| m.and_then(|(_, u)| u).map(str::to_string);
        let units = ReadingUnits {
            hotspot: unit(self.hotspot),
            coldspot: unit(self.coldspot),
            difference: unit(self.difference),
        };
        ThermalReading::new(
            self.image_id,
            self.hotspot.map(|(v, _)| v),
            self.coldspot.map(|(v, _)| v),
            self.difference.map(|(v, _)| v),
            units,
            self.offset,
            rule,
        )
    }
}

pub struct ThermalExtractor {
    rule: AssessmentRule,
}

impl ThermalExtractor {
    pub fn new(rule: AssessmentRule) -> Self {
        Self { rule }
    }

    /// Parse every block in source order, duplicates included.
    pub fn parse_blocks(&self, text: &str) -> DdrResult<Vec<ThermalReading>> {
        let mut matches: Vec<(usize, ThermalField, &str)> = Vec::new();
        for rule in THERMAL_RULES.iter() {
            for caps in rule.regex.captures_iter(text) {
                if let (Some(line), Some(value)) = (caps.get(0), caps.name("value")) {
                    matches.push((line.start(), rule.field, value.as_str()));
                }
            }
        }
        matches.sort_by_key(|&(offset, _, _)| offset);

        let mut readings = Vec::new();
        let mut current: Option<Block<'_>> = None;

        for (offset, field, value) in matches {
            if field == ThermalField::ImageId {
                if value.is_empty() || value.split_whitespace().count() != 1 {
                    return Err(thermal_error(format!(
                        "image id at byte {offset} must be a single token, got '{value}'"
                    )));
                }
                if let Some(done) = current.take() {
                    readings.push(done.into_reading(&self.rule));
                }
                current = Some(Block::new(value, offset));
                continue;
            }

            let Some(block) = current.as_mut() else {
                return Err(thermal_error(format!(
                    "{} line at byte {offset} precedes any image id",
                    field.name()
                )));
            };
            let image_id = block.image_id;
            let measured = parse_measured(image_id, field, value)?;
            match block.slot(field) {
                Some(slot) if slot.is_none() => *slot = Some(measured),
                _ => {
                    return Err(thermal_error(format!(
                        "{} appears twice in the block for image '{image_id}'",
                        field.name()
                    )))
                }
            }
        }

        if let Some(done) = current.take() {
            readings.push(done.into_reading(&self.rule));
        }
        Ok(readings)
    }
}

impl ThermalScanner for ThermalExtractor {
    fn scan(&self, text: &str) -> DdrResult<ThermalExtraction> {
        let parsed = self.parse_blocks(text)?;
        if parsed.is_empty() {
            return Err(thermal_error("no image ids found".to_string()));
        }

        let mut seen: HashMap<String, (usize, usize)> = HashMap::new();
        let mut extraction = ThermalExtraction::default();

        for reading in parsed {
            match seen.get_mut(&reading.image_id) {
                Some((kept_offset, sightings)) => {
                    *sightings += 1;
                    warn!(
                        image_id = %reading.image_id,
                        occurrence = *sightings,
                        "duplicate thermal block suppressed"
                    );
                    extraction.duplicates.push(DuplicateRecord {
                        image_id: reading.image_id.clone(),
                        occurrence: *sightings,
                        kept_offset: *kept_offset,
                        dropped_offset: reading.source_offset,
                        suppressed: reading,
                    });
                }
                None => {
                    debug!(image_id = %reading.image_id, assessment = ?reading.assessment, "thermal reading extracted");
                    seen.insert(reading.image_id.clone(), (reading.source_offset, 1));
                    extraction.readings.push(reading);
                }
            }
        }

        debug!(
            readings = extraction.readings.len(),
            duplicates = extraction.duplicates.len(),
            "thermal extraction finished"
        );
        Ok(extraction)
    }
}

fn parse_measured<'t>(image_id: &str, field: ThermalField, raw: &'t str) -> DdrResult<Measured<'t>> {
    let parse_error = || DdrError::NumericParse {
        image_id: image_id.to_string(),
        field: field.name().to_string(),
        raw: raw.to_string(),
    };
    let caps = NUMERIC_VALUE.captures(raw).ok_or_else(parse_error)?;
    let number = caps.name("number").ok_or_else(parse_error)?;
    let value: f64 = number.as_str().parse().map_err(|_| parse_error())?;
    if !value.is_finite() {
        return Err(parse_error());
    }
    Ok((value, caps.name("unit").map(|u| u.as_str())))
}

fn thermal_error(reason: String) -> DdrError {
    DdrError::Extraction {
        document: DocumentKind::Thermal,
        reason,
    }
}
