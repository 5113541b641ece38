//! Room recognition.
//!
//! `RoomMatcher` answers two questions for the extractors:
//!
//! - is this label a room? (`recognize`, for `<label>: <observation>` lines)
//! - which room does this description start with? (`leading_room`)
//!
//! Both are driven purely by the room dictionary; neither guesses.

use std::collections::HashSet;

use ddr_config::{rooms::slug, RoomDictionary};
use ddr_contracts::area::CanonicalKey;

use crate::canonical::RoomCanonicalizer;

/// Labels longer than this many words are never rooms.
const MAX_LABEL_WORDS: usize = 5;
/// Room phrases are looked for among this many leading words.
const MAX_PHRASE_WORDS: usize = 4;

/// A room phrase found at the start of a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMention<'t> {
    /// The phrase exactly as it appears in the source.
    pub display: &'t str,
    pub key: CanonicalKey,
}

#[derive(Debug, Clone)]
pub struct RoomMatcher {
    canonicalizer: RoomCanonicalizer,
    nouns: HashSet<String>,
}

impl RoomMatcher {
    pub fn new(dictionary: &RoomDictionary) -> Self {
        Self {
            canonicalizer: RoomCanonicalizer::new(dictionary),
            nouns: dictionary.noun_set(),
        }
    }

    pub fn canonicalizer(&self) -> &RoomCanonicalizer {
        &self.canonicalizer
    }

    /// Return the canonical key if `label` names a room.
    ///
    /// A label is a room when it has at most five words and its key is a
    /// dictionary entry or contains a configured room noun.
    pub fn recognize(&self, label: &str) -> Option<CanonicalKey> {
        let words = label.split_whitespace().count();
        if words == 0 || words > MAX_LABEL_WORDS {
            return None;
        }
        let key = self.canonicalizer.canonicalize(label);
        if key.as_str().is_empty() {
            return None;
        }
        let is_room = self.canonicalizer.is_dictionary_key(&key)
            || key.as_str().split(' ').any(|w| self.nouns.contains(w));
        is_room.then_some(key)
    }

    /// Find the room phrase `text` starts with.
    ///
    /// Dictionary phrases over the first one to four words are tried longest
    /// first. Failing that, the first room noun within the first four words
    /// is taken, provided every word before it is capitalized or numeric, and
    /// a directly following number joins the phrase (`Bedroom 2`).
    pub fn leading_room<'t>(&self, text: &'t str) -> Option<RoomMention<'t>> {
        let words = word_spans(text, MAX_PHRASE_WORDS + 1);
        if words.is_empty() {
            return None;
        }

        for n in (1..=words.len().min(MAX_PHRASE_WORDS)).rev() {
            let display = phrase(text, words[n - 1].1);
            let key = self.canonicalizer.canonicalize(display);
            if self.canonicalizer.is_dictionary_key(&key) {
                return Some(RoomMention { display, key });
            }
        }

        for (i, &(start, end)) in words.iter().take(MAX_PHRASE_WORDS).enumerate() {
            let word = &text[start..end];
            let word_slug = slug(word);
            let head = word_slug.split(' ').next().unwrap_or_default();
            if self.nouns.contains(head) {
                let mut phrase_end = end;
                let has_number = word_slug.split(' ').skip(1).any(is_number);
                if !has_number {
                    if let Some(&(next_start, next_end)) = words.get(i + 1) {
                        if is_number(&slug(&text[next_start..next_end])) {
                            phrase_end = next_end;
                        }
                    }
                }
                let display = phrase(text, phrase_end);
                return Some(RoomMention {
                    display,
                    key: self.canonicalizer.canonicalize(display),
                });
            }
            if !word.chars().next().is_some_and(|c| c.is_uppercase() || c.is_ascii_digit()) {
                return None;
            }
        }
        None
    }
}

/// Byte spans of the first `limit` whitespace-separated words.
fn word_spans(text: &str, limit: usize) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(s) = start.take() {
                spans.push((s, i));
                if spans.len() == limit {
                    return spans;
                }
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}

/// `text[..end]` without leading whitespace or trailing punctuation.
fn phrase(text: &str, end: usize) -> &str {
    text[..end]
        .trim_start()
        .trim_end_matches(|c: char| !c.is_alphanumeric())
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
