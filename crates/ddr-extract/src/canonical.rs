//! Room-name canonicalization.
//!
//! `canonicalize` is a pure function of its input and the dictionary it was
//! built from: slug the raw string, then map it through the synonym table.
//! Unknown rooms keep their slug as the key.

use std::collections::{HashMap, HashSet};

use ddr_config::{rooms::slug, RoomDictionary};
use ddr_contracts::area::CanonicalKey;

#[derive(Debug, Clone)]
pub struct RoomCanonicalizer {
    table: HashMap<String, String>,
    canonical: HashSet<String>,
}

impl RoomCanonicalizer {
    pub fn new(dictionary: &RoomDictionary) -> Self {
        Self {
            table: dictionary.lookup_table(),
            canonical: dictionary.canonical_keys(),
        }
    }

    /// Map a raw room mention to its canonical key.
    ///
    /// `"Bed Room 1"`, `"Bedroom-1"` and `"BEDROOM 1"` all yield `bedroom 1`.
    /// Canonicalizing a canonical key returns it unchanged.
    pub fn canonicalize(&self, raw: &str) -> CanonicalKey {
        let slugged = slug(raw);
        match self.table.get(&slugged) {
            Some(key) => CanonicalKey::from_normalized(key.as_str()),
            None => CanonicalKey::from_normalized(slugged),
        }
    }

    /// True if `key` is one of the dictionary's canonical entries.
    pub fn is_dictionary_key(&self, key: &CanonicalKey) -> bool {
        self.canonical.contains(key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use ddr_config::PipelineConfig;

    use super::*;

    fn canonicalizer() -> RoomCanonicalizer {
        RoomCanonicalizer::new(&PipelineConfig::builtin().unwrap().rooms)
    }

    #[test]
    fn synonyms_share_one_key() {
        let c = canonicalizer();
        for raw in ["Bed Room 1", "Bedroom-1", "BEDROOM 1", " bedroom1 ", "bedroom one"] {
            assert_eq!(c.canonicalize(raw).as_str(), "bedroom 1", "raw: {raw:?}");
        }
        assert_eq!(c.canonicalize("MB Bathroom").as_str(), "master bathroom");
        assert_eq!(c.canonicalize("MB").as_str(), "master bedroom");
    }

    #[test]
    fn unknown_rooms_keep_their_slug() {
        let c = canonicalizer();
        let key = c.canonicalize("Guest  Bedroom");
        assert_eq!(key.as_str(), "guest bedroom");
        assert!(!c.is_dictionary_key(&key));
        assert!(c.is_dictionary_key(&c.canonicalize("Kitchen")));
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let c = canonicalizer();
        for raw in ["Bed Room 1", "Common Toilet", "Guest Bedroom", "Store-Room 2", "Living", "Hall"] {
            let once = c.canonicalize(raw);
            let twice = c.canonicalize(once.as_str());
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn canonicalize_is_deterministic() {
        let a = canonicalizer();
        let b = canonicalizer();
        assert_eq!(a.canonicalize("Master Bed Room"), b.canonicalize("Master Bed Room"));
    }
}
