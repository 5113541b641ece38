//! Validation and verification report types.
//!
//! `ValidationReport` is produced by the entity-lock stage before anything is
//! rendered; the orchestrator only continues when it passed. The verdict is
//! derived from the recorded checks and cannot be set directly, so a report
//! with no checks never passes.
//! `VerificationReport` is produced after rendering, when the finished report
//! is checked against the frozen extraction it was built from.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    area::CanonicalKey,
    error::DdrError,
    thermal::DuplicateRecord,
};

/// Room keys found by the independent second scan of the inspection text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedRooms {
    keys: BTreeSet<CanonicalKey>,
}

impl ExpectedRooms {
    pub fn from_keys(keys: impl IntoIterator<Item = CanonicalKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn count(&self) -> usize {
        self.keys.len()
    }

    pub fn contains(&self, key: &CanonicalKey) -> bool {
        self.keys.contains(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CanonicalKey> {
        self.keys.iter()
    }
}

/// The structural invariants the validation stage enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvariantClass {
    /// Normalization merged only under existing keys.
    Normalization,
    /// Extracted room count equals the independently counted mentions.
    EntityCount,
    /// No two thermal readings share an image ID.
    DuplicateThermalIds,
    /// Image IDs and room names stayed on their own side.
    CrossContamination,
    /// Area count stays under the configured ceiling.
    AreaLimit,
}

impl fmt::Display for InvariantClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InvariantClass::Normalization => "normalization",
            InvariantClass::EntityCount => "entity-count",
            InvariantClass::DuplicateThermalIds => "duplicate-thermal-ids",
            InvariantClass::CrossContamination => "cross-contamination",
            InvariantClass::AreaLimit => "area-limit",
        };
        f.write_str(name)
    }
}

/// Outcome of one invariant check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantCheck {
    pub invariant: InvariantClass,
    pub passed: bool,
    pub expected: Option<usize>,
    pub actual: Option<usize>,
    /// Room keys or image IDs responsible for a failure. Empty on pass.
    pub offending: Vec<String>,
    pub message: String,
}

impl InvariantCheck {
    pub fn pass(invariant: InvariantClass, message: impl Into<String>) -> Self {
        Self {
            invariant,
            passed: true,
            expected: None,
            actual: None,
            offending: Vec::new(),
            message: message.into(),
        }
    }

    pub fn fail(invariant: InvariantClass, offending: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            invariant,
            passed: false,
            expected: None,
            actual: None,
            offending,
            message: message.into(),
        }
    }

    /// Attach the two counts that were compared.
    pub fn with_counts(mut self, expected: usize, actual: usize) -> Self {
        self.expected = Some(expected);
        self.actual = Some(actual);
        self
    }
}

/// Machine-readable pass/fail record for every invariant class.
///
/// Calling tooling uses this to decide whether to show the report or an error.
/// Serialize-only: a report is built by recording checks, never read back in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Mirror of `passed()`, refreshed on every mutation.
    passed: bool,
    checks: Vec<InvariantCheck>,
    /// Duplicates the thermal extractor already dropped. Informational.
    pub suppressed_duplicates: Vec<DuplicateRecord>,
    /// Duplicates the second uniqueness pass found. Any entry fails the run.
    rejected_duplicates: Vec<DuplicateRecord>,
}

impl ValidationReport {
    /// An empty report carrying the extractor's suppressed duplicates.
    pub fn with_suppressed(suppressed_duplicates: Vec<DuplicateRecord>) -> Self {
        Self {
            suppressed_duplicates,
            ..Self::default()
        }
    }

    pub fn single(check: InvariantCheck) -> Self {
        let mut report = Self::default();
        report.record(check);
        report
    }

    /// True only if at least one check was recorded, every recorded check
    /// passed, and the second uniqueness pass rejected nothing.
    pub fn passed(&self) -> bool {
        !self.checks.is_empty() && self.checks.iter().all(|c| c.passed) && self.rejected_duplicates.is_empty()
    }

    pub fn record(&mut self, check: InvariantCheck) {
        self.checks.push(check);
        self.passed = self.passed();
    }

    /// Record duplicates the second uniqueness pass found. Fails the report.
    pub fn reject_duplicates(&mut self, duplicates: Vec<DuplicateRecord>) {
        self.rejected_duplicates.extend(duplicates);
        self.passed = self.passed();
    }

    /// Fold another report's checks into this one.
    pub fn absorb(&mut self, other: ValidationReport) {
        self.checks.extend(other.checks);
        self.suppressed_duplicates.extend(other.suppressed_duplicates);
        self.rejected_duplicates.extend(other.rejected_duplicates);
        self.passed = self.passed();
    }

    pub fn checks(&self) -> &[InvariantCheck] {
        &self.checks
    }

    pub fn rejected_duplicates(&self) -> &[DuplicateRecord] {
        &self.rejected_duplicates
    }

    pub fn check(&self, invariant: InvariantClass) -> Option<&InvariantCheck> {
        self.checks.iter().find(|c| c.invariant == invariant)
    }

    pub fn failures(&self) -> impl Iterator<Item = &InvariantCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }

    /// `[class] message; [class] message` over failed checks.
    pub fn failure_summary(&self) -> String {
        if self.checks.is_empty() {
            return "no validation checks were recorded".to_string();
        }
        self.failures()
            .map(|c| format!("[{}] {}", c.invariant, c.message))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn offending_identifiers(&self) -> Vec<String> {
        self.failures().flat_map(|c| c.offending.iter().cloned()).collect()
    }

    /// The error a failed report is surfaced as, or `None` if it passed.
    ///
    /// A duplicate image ID found by the second pass is reported as
    /// `DuplicateEntity`; every other failure is `StructuralIntegrity`.
    pub fn rejection_error(&self) -> Option<DdrError> {
        if self.passed() {
            return None;
        }
        let duplicate_failed = self
            .check(InvariantClass::DuplicateThermalIds)
            .is_some_and(|c| !c.passed);
        if duplicate_failed {
            if let Some(first) = self.rejected_duplicates.first() {
                let occurrences = self
                    .rejected_duplicates
                    .iter()
                    .filter(|d| d.image_id == first.image_id)
                    .map(|d| d.occurrence)
                    .max()
                    .unwrap_or(first.occurrence);
                return Some(DdrError::DuplicateEntity {
                    image_id: first.image_id.clone(),
                    occurrences,
                });
            }
        }
        Some(DdrError::StructuralIntegrity {
            reason: self.failure_summary(),
            offending: self.offending_identifiers(),
        })
    }
}

/// Result of checking a rendered report against its frozen source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub passed: bool,
    pub failures: Vec<VerificationFailure>,
}

/// A single failed report check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationFailure {
    pub rule_id: String,
    pub message: String,
}
