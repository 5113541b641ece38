//! Error types for the diagnostic report pipeline.
//!
//! All fallible operations return `DdrResult<T>`. Every variant carries the
//! offending identifier(s) so a caller can show the user exactly what failed.
//! None of them is ever downgraded to a best-effort output.

use thiserror::Error;

use crate::extraction::DocumentKind;

/// The unified error type for the pipeline.
#[derive(Debug, Error)]
pub enum DdrError {
    /// A document contained no recognizable entities, or a match was too
    /// ambiguous to attribute without guessing.
    #[error("{document} extraction failed: {reason}")]
    Extraction { document: DocumentKind, reason: String },

    /// A thermal numeric field did not satisfy the strict numeric grammar.
    #[error("malformed {field} value '{raw}' for image '{image_id}'")]
    NumericParse {
        image_id: String,
        field: String,
        raw: String,
    },

    /// Entity-count mismatch, a key created during normalization, or any
    /// other violation of the structural invariants.
    #[error("structural integrity violated: {reason}")]
    StructuralIntegrity { reason: String, offending: Vec<String> },

    /// An image ID survived extraction more than once.
    #[error("image id '{image_id}' appears {occurrences} times after deduplication")]
    DuplicateEntity { image_id: String, occurrences: usize },

    /// A report section needs a field the frozen result does not carry.
    #[error("section '{section}' requires field '{field}' of '{entity}', which is absent")]
    IncompleteData {
        section: String,
        entity: String,
        field: String,
    },

    /// The rendered report does not restate its source faithfully.
    #[error("report verification failed: {reason}")]
    ReportVerification { reason: String },

    /// A configuration value is missing, malformed, or inconsistent.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// A stage record could not be appended to the run's audit trail.
    ///
    /// Treated as fatal: a stage that cannot be audited does not proceed.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },
}

/// Convenience alias used throughout the workspace.
pub type DdrResult<T> = Result<T, DdrError>;
