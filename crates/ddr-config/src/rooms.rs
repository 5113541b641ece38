//! Room dictionary schema and the slug rule shared by config validation and
//! the canonicalizer.
//!
//! ```toml
//! [rooms]
//! nouns = ["hall", "bedroom", "kitchen"]
//!
//! [[rooms.entries]]
//! canonical = "bedroom 1"
//! synonyms = ["Bed Room 1", "bedroom one"]
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use ddr_contracts::error::{DdrError, DdrResult};

/// Reduce `raw` to its slug form.
///
/// Lowercases, treats every non-alphanumeric character as a separator, splits
/// at letter/digit boundaries, then joins the pieces with single spaces.
/// `"Bedroom-1"`, `"BEDROOM 1"` and `" bedroom1 "` all become `"bedroom 1"`.
/// Applying it twice gives the same result as applying it once.
pub fn slug(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev: Option<char> = None;
    let mut pending_separator = false;

    for ch in raw.chars().flat_map(char::to_lowercase) {
        if !ch.is_alphanumeric() {
            pending_separator = true;
            continue;
        }
        if let Some(p) = prev {
            let boundary = p.is_numeric() != ch.is_numeric();
            if pending_separator || boundary {
                out.push(' ');
            }
        }
        out.push(ch);
        prev = Some(ch);
        pending_separator = false;
    }
    out
}

/// One canonical room and the spellings that refer to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomEntry {
    /// Canonical key, already in slug form.
    pub canonical: String,

    #[serde(default)]
    pub synonyms: Vec<String>,
}

/// The static canonical-room-name dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomDictionary {
    /// Single-word room nouns used to recognize rooms missing from `entries`.
    #[serde(default)]
    pub nouns: Vec<String>,

    #[serde(default)]
    pub entries: Vec<RoomEntry>,
}

impl RoomDictionary {
    /// Check that the dictionary defines a function from slugs to keys.
    ///
    /// Every canonical key must already be a slug and map to itself; every
    /// synonym must map to exactly one entry; nouns must be single slug words.
    pub fn validate(&self) -> DdrResult<()> {
        let mut owner: HashMap<String, &str> = HashMap::new();

        for entry in &self.entries {
            if entry.canonical.is_empty() || slug(&entry.canonical) != entry.canonical {
                return Err(config_error(format!(
                    "room canonical key '{}' is not in slug form (expected '{}')",
                    entry.canonical,
                    slug(&entry.canonical)
                )));
            }
            if owner.insert(entry.canonical.clone(), &entry.canonical).is_some() {
                return Err(config_error(format!(
                    "room canonical key '{}' is declared twice",
                    entry.canonical
                )));
            }
        }

        for entry in &self.entries {
            for synonym in &entry.synonyms {
                let key = slug(synonym);
                if key.is_empty() {
                    return Err(config_error(format!(
                        "room '{}' has a synonym with no letters or digits",
                        entry.canonical
                    )));
                }
                match owner.get(key.as_str()) {
                    Some(existing) if *existing == entry.canonical => {}
                    Some(existing) => {
                        return Err(config_error(format!(
                            "synonym '{}' of room '{}' already refers to room '{}'",
                            synonym, entry.canonical, existing
                        )));
                    }
                    None => {
                        owner.insert(key, &entry.canonical);
                    }
                }
            }
        }

        for noun in &self.nouns {
            if noun.is_empty() || slug(noun) != *noun || noun.contains(' ') {
                return Err(config_error(format!(
                    "room noun '{}' must be a single lowercase word",
                    noun
                )));
            }
        }

        Ok(())
    }

    /// Slug → canonical key, covering each canonical key and every synonym.
    pub fn lookup_table(&self) -> HashMap<String, String> {
        let mut table = HashMap::new();
        for entry in &self.entries {
            table.insert(entry.canonical.clone(), entry.canonical.clone());
            for synonym in &entry.synonyms {
                table.insert(slug(synonym), entry.canonical.clone());
            }
        }
        table
    }

    pub fn canonical_keys(&self) -> HashSet<String> {
        self.entries.iter().map(|e| e.canonical.clone()).collect()
    }

    pub fn noun_set(&self) -> HashSet<String> {
        self.nouns.iter().cloned().collect()
    }
}

fn config_error(reason: String) -> DdrError {
    DdrError::Config { reason }
}
