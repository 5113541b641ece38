//! Impacted-area types.
//!
//! An `ImpactedArea` is the inspection-side entity: one room, identified by its
//! `CanonicalKey`, holding the observation strings copied verbatim out of the
//! inspection text. Thermal data never lives here.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Normalized, case- and whitespace-insensitive room identifier.
///
/// Two raw room mentions refer to the same entity iff they canonicalize to
/// the same key. Keys are produced by the canonicalizer in `ddr-extract`;
/// this type only carries the already-normalized string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Wrap a string that is already in canonical form.
    pub fn from_normalized(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The locked root-cause value.
///
/// Root cause is never derived from observations. The type has exactly one
/// value, serializes as `"Not Available"`, and refuses to deserialize any
/// other string, so no payload or configuration can smuggle a cause in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RootCause;

impl RootCause {
    pub const TEXT: &'static str = "Not Available";

    pub fn as_str(&self) -> &'static str {
        Self::TEXT
    }
}

impl fmt::Display for RootCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::TEXT)
    }
}

impl Serialize for RootCause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(Self::TEXT)
    }
}

impl<'de> Deserialize<'de> for RootCause {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == Self::TEXT {
            Ok(RootCause)
        } else {
            Err(serde::de::Error::custom(format!(
                "root cause is locked to '{}', got '{}'",
                Self::TEXT,
                raw
            )))
        }
    }
}

/// One impacted room and everything the inspection text says about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactedArea {
    /// Unique within an `ExtractionResult`.
    pub canonical_room_key: CanonicalKey,
    /// Original casing of the first mention.
    pub display_name: String,
    /// Observation strings in first-seen order, deduplicated by exact bytes.
    observations: Vec<String>,
    /// Always `Not Available`.
    #[serde(default)]
    pub root_cause: RootCause,
}

impl ImpactedArea {
    /// Create an area from its first mention.
    pub fn new(key: CanonicalKey, display_name: impl Into<String>, observation: impl Into<String>) -> Self {
        Self {
            canonical_room_key: key,
            display_name: display_name.into(),
            observations: vec![observation.into()],
            root_cause: RootCause,
        }
    }

    /// Create an area with an explicit observation list (deduplicated on the way in).
    pub fn with_observations(
        key: CanonicalKey,
        display_name: impl Into<String>,
        observations: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut area = Self {
            canonical_room_key: key,
            display_name: display_name.into(),
            observations: Vec::new(),
            root_cause: RootCause,
        };
        for obs in observations {
            area.push_observation(obs);
        }
        area
    }

    pub fn observations(&self) -> &[String] {
        &self.observations
    }

    /// Append `observation` unless a byte-identical one is already present.
    ///
    /// Returns true when the observation was appended.
    pub fn push_observation(&mut self, observation: impl Into<String>) -> bool {
        let observation = observation.into();
        if self.observations.iter().any(|o| *o == observation) {
            return false;
        }
        self.observations.push(observation);
        true
    }
}
