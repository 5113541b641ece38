//! Rule-table extractors.
//!
//! - [`InspectionExtractor`]: rooms and observations from inspection text.
//! - [`StrictMentionCounter`]: an independent count of the rooms the
//!   inspection text mentions, for the entity lock.
//! - [`ThermalExtractor`]: per-image temperature readings.
//!
//! All patterns live in [`rules`] with stable IDs and a ruleset version.
//! Extraction never infers: an observation is a verbatim slice of its source,
//! and anything that cannot be attributed without guessing is an error.

pub mod canonical;
pub mod inspection;
pub mod mentions;
pub mod rooms;
pub mod rules;
pub mod thermal;

pub use canonical::RoomCanonicalizer;
pub use inspection::{InspectionExtractor, InspectionMatch};
pub use mentions::StrictMentionCounter;
pub use rooms::{RoomMatcher, RoomMention};
pub use rules::{listing, RuleListing, RULESET_VERSION};
pub use thermal::ThermalExtractor;
