//! Error types for chip-annotate
//!
//! Every variant names the record or project it concerns so callers can point
//! a curator at the offending row.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// chip-annotate error types
#[derive(Error, Debug)]
pub enum Error {
    /// A record arrived without a field the pipeline cannot default
    #[error("Missing required field `{field}` on experiment '{experiment_id}'\nThe annotation stage must supply it; refusing to guess")]
    MissingField {
        /// Experiment the field is missing from (`<blank>` when the id itself is missing)
        experiment_id: String,
        /// Name of the missing field
        field: &'static str,
    },

    /// The same experiment appears twice within one project
    #[error("Duplicate experiment '{experiment_id}' in project '{project_id}'")]
    DuplicateExperiment {
        /// Project containing the duplicate
        project_id: String,
        /// Repeated experiment id
        experiment_id: String,
    },

    /// A control-matching group mixes records from different projects
    #[error("Project mismatch: group is '{expected}' but record belongs to '{found}'")]
    ProjectMismatch {
        /// Project id of the group
        expected: String,
        /// Project id of the stray record
        found: String,
    },

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage error (Parquet/Arrow)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Malformed annotation JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
