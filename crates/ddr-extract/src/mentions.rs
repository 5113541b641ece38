//! Independent room-mention counter.
//!
//! The entity lock compares the extractor's areas against this count, so the
//! counter must not share the extractor's regexes. It walks the text line by
//! line with plain case-insensitive literal search and a three-state machine
//! for description blocks. Only the room dictionary and the definition of a
//! line ([`source_lines`]) are shared.

use tracing::debug;

use ddr_config::RoomDictionary;
use ddr_contracts::{
    area::CanonicalKey,
    error::{DdrError, DdrResult},
    extraction::DocumentKind,
    validation::ExpectedRooms,
};
use ddr_core::traits::MentionCounter;

use crate::{rooms::RoomMatcher, rules::source_lines};

const MARKERS: [&str; 2] = ["negative side description", "positive side description"];
const TERMINATORS: [&str; 4] = [
    "negative side photographs",
    "positive side",
    "negative side description",
    "impacted area",
];
const PHOTO: &str = "photo ";
const MAX_LABEL_CHARS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    /// After a marker, before the first non-blank content.
    AwaitingContent,
    /// Inside a description body.
    Inside,
}

pub struct StrictMentionCounter {
    matcher: RoomMatcher,
}

impl StrictMentionCounter {
    pub fn new(dictionary: &RoomDictionary) -> Self {
        Self {
            matcher: RoomMatcher::new(dictionary),
        }
    }

    fn labeled(&self, line: &str) -> Option<CanonicalKey> {
        let (label, obs) = line.split_once(':')?;
        let label = label.trim();
        let chars = label.chars().count();
        if chars == 0 || chars > MAX_LABEL_CHARS || obs.trim().is_empty() {
            return None;
        }
        self.matcher.recognize(label)
    }
}

impl MentionCounter for StrictMentionCounter {
    fn count(&self, text: &str) -> DdrResult<ExpectedRooms> {
        let mut keys: Vec<CanonicalKey> = Vec::new();
        let mut state = State::Outside;

        for (line_no, line) in source_lines(text).enumerate() {
            // ASCII lowering keeps byte offsets aligned with `line`.
            let lower = line.to_ascii_lowercase();
            let mut pos = 0;
            let mut touched = false;

            loop {
                match state {
                    State::Outside => {
                        let Some((at, len)) = find_marker(&lower[pos..]) else {
                            break;
                        };
                        touched = true;
                        pos += at + len;
                        state = State::AwaitingContent;
                    }
                    State::AwaitingContent => {
                        let start = skip(line, pos, |c| c == ':' || c.is_whitespace());
                        if start == line.len() {
                            break;
                        }
                        if find_terminator(&lower[start..]) == Some(0) {
                            pos = start;
                            state = State::Outside;
                            continue;
                        }
                        touched = true;
                        let cut = find_terminator(&lower[start..]).map(|p| start + p);
                        let content = &line[start..cut.unwrap_or(line.len())];
                        let Some(mention) = self.matcher.leading_room(content) else {
                            return Err(DdrError::Extraction {
                                document: DocumentKind::Inspection,
                                reason: format!(
                                    "description on line {} does not start with a recognizable room: '{}'",
                                    line_no + 1,
                                    content.trim_end()
                                ),
                            });
                        };
                        keys.push(mention.key);
                        match cut {
                            Some(c) => {
                                pos = c;
                                state = State::Outside;
                            }
                            None => {
                                state = State::Inside;
                                break;
                            }
                        }
                    }
                    State::Inside => {
                        let start = skip(line, pos, char::is_whitespace);
                        match find_terminator(&lower[start..]) {
                            Some(0) => {
                                pos = start;
                                state = State::Outside;
                            }
                            Some(p) => {
                                touched = true;
                                pos = start + p;
                                state = State::Outside;
                            }
                            None => {
                                touched |= start < line.len();
                                break;
                            }
                        }
                    }
                }
            }

            if !touched {
                if let Some(key) = self.labeled(line) {
                    keys.push(key);
                }
            }
        }

        let expected = ExpectedRooms::from_keys(keys);
        debug!(rooms = expected.count(), "room mentions counted");
        Ok(expected)
    }
}

/// First byte index at or after `from` whose char does not satisfy `pred`.
fn skip(line: &str, from: usize, pred: impl Fn(char) -> bool) -> usize {
    line[from..]
        .char_indices()
        .find(|&(_, c)| !pred(c))
        .map_or(line.len(), |(i, _)| from + i)
}

/// Earliest description marker in already-lowered text, with its length.
fn find_marker(lower: &str) -> Option<(usize, usize)> {
    MARKERS
        .iter()
        .filter_map(|m| lower.find(m).map(|at| (at, m.len())))
        .min_by_key(|&(at, _)| at)
}

/// Earliest terminator in already-lowered text.
fn find_terminator(lower: &str) -> Option<usize> {
    let literal = TERMINATORS.iter().filter_map(|t| lower.find(t)).min();
    let photo = lower
        .match_indices(PHOTO)
        .map(|(at, _)| at)
        .find(|&at| lower.as_bytes().get(at + PHOTO.len()).is_some_and(u8::is_ascii_digit));
    match (literal, photo) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
