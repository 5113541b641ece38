//! Inspection-text extractor.
//!
//! Applies the inspection rule table in source order:
//!
//! 1. Every description marker opens a block that runs to the next
//!    terminator. The block text, trimmed, is one observation; its leading
//!    room phrase names the area.
//! 2. Every `<label>: <observation>` line that does not overlap a description
//!    block is an observation for the room the label names, if it names one.
//!
//! Observations are slices of the input; nothing is rewritten.

use tracing::{debug, warn};

use ddr_config::RoomDictionary;
use ddr_contracts::{
    area::CanonicalKey,
    error::{DdrError, DdrResult},
    extraction::{DocumentKind, InspectionExtraction},
};
use ddr_core::traits::InspectionScanner;

use crate::{
    rooms::RoomMatcher,
    rules::{source_lines, InspectionField, DESCRIPTION_TERMINATOR, INSPECTION_RULES},
};

/// One rule match, before it is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionMatch<'t> {
    pub rule_id: &'static str,
    /// Byte offset of the match in the source text.
    pub offset: usize,
    pub room: &'t str,
    pub key: CanonicalKey,
    pub observation: &'t str,
}

pub struct InspectionExtractor {
    matcher: RoomMatcher,
}

impl InspectionExtractor {
    pub fn new(dictionary: &RoomDictionary) -> Self {
        Self {
            matcher: RoomMatcher::new(dictionary),
        }
    }

    /// All rule matches in `text`, in source order.
    pub fn matches<'t>(&self, text: &'t str) -> DdrResult<Vec<InspectionMatch<'t>>> {
        let mut found: Vec<InspectionMatch<'t>> = Vec::new();
        let mut claimed: Vec<(usize, usize)> = Vec::new();

        for rule in INSPECTION_RULES.iter().filter(|r| r.field == InspectionField::Description) {
            for marker in rule.regex.find_iter(text) {
                let body_start = marker.end();
                let body_end = DESCRIPTION_TERMINATOR
                    .find_at(text, body_start)
                    .map_or(text.len(), |t| t.start());
                let (obs_start, observation) = trimmed(text, body_start, body_end);

                if observation.is_empty() {
                    claimed.push((marker.start(), marker.end()));
                    continue;
                }
                claimed.push((marker.start(), obs_start + observation.len()));

                let first_line = source_lines(observation).next().unwrap_or(observation);
                let Some(mention) = self.matcher.leading_room(first_line) else {
                    warn!(
                        rule_id = rule.id,
                        offset = marker.start(),
                        "description has no recognizable leading room"
                    );
                    return Err(DdrError::Extraction {
                        document: DocumentKind::Inspection,
                        reason: format!(
                            "description at byte {} does not start with a recognizable room: '{}'",
                            marker.start(),
                            first_line
                        ),
                    });
                };

                found.push(InspectionMatch {
                    rule_id: rule.id,
                    offset: marker.start(),
                    room: mention.display,
                    key: mention.key,
                    observation,
                });
            }
        }

        for rule in INSPECTION_RULES.iter().filter(|r| r.field == InspectionField::LabeledLine) {
            for caps in rule.regex.captures_iter(text) {
                let (Some(line), Some(label), Some(obs)) = (caps.get(0), caps.name("label"), caps.name("obs")) else {
                    continue;
                };
                let overlaps = claimed
                    .iter()
                    .any(|&(start, end)| line.start() < end && start < line.end());
                if overlaps {
                    continue;
                }
                if let Some(key) = self.matcher.recognize(label.as_str()) {
                    found.push(InspectionMatch {
                        rule_id: rule.id,
                        offset: line.start(),
                        room: label.as_str(),
                        key,
                        observation: obs.as_str(),
                    });
                }
            }
        }

        found.sort_by_key(|m| m.offset);
        Ok(found)
    }
}

impl InspectionScanner for InspectionExtractor {
    fn scan(&self, text: &str) -> DdrResult<InspectionExtraction> {
        let mut extraction = InspectionExtraction::new();

        for m in self.matches(text)? {
            let outcome = extraction.record(m.key.clone(), m.room, m.observation);
            debug!(
                rule_id = m.rule_id,
                room = %m.key,
                offset = m.offset,
                outcome = ?outcome,
                "inspection match recorded"
            );
        }

        if extraction.is_empty() {
            return Err(DdrError::Extraction {
                document: DocumentKind::Inspection,
                reason: "no recognizable room mentions".to_string(),
            });
        }

        debug!(areas = extraction.areas().len(), "inspection extraction finished");
        Ok(extraction)
    }
}

/// Trim `text[start..end]`, also dropping a leading colon, and return the
/// trimmed slice with its start offset.
fn trimmed(text: &str, start: usize, end: usize) -> (usize, &str) {
    let body = &text[start..end];
    let head = body.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
    let offset = start + (body.len() - head.len());
    (offset, head.trim_end())
}
