//! Experiment record schema
//!
//! The annotation stage produces one [`ExperimentRecord`] per sequencing
//! experiment. Records are grouped by project and flow through the validator,
//! the tagger and the control resolver, each of which only adds derived
//! fields.
//!
//! ## Usage
//!
//! ```rust
//! use chip_annotate::record::{ExperimentRecord, PerturbationClass};
//!
//! let record = ExperimentRecord::builder("SRX1", "PRJNA1")
//!     .chip_target("H3K4me3")
//!     .perturbed(PerturbationClass::GeneDeletion, "Swi6")
//!     .build();
//!
//! assert_eq!(record.active_perturbation(), Some(PerturbationClass::GeneDeletion));
//! assert_eq!(record.descriptor(PerturbationClass::GeneDeletion), Some("Swi6"));
//! ```

mod experiment_record;
mod perturbation;
mod project;

pub use experiment_record::{ExperimentRecord, ExperimentRecordBuilder, NO_CONTROL};
pub use perturbation::{FlagPair, Perturbation, PerturbationClass};
pub use project::{group_by_project, ProjectAnnotation, ProjectGroup};
