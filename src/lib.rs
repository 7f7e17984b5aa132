//! # chip-annotate: post-processing for LLM-annotated ChIP-seq metadata
//!
//! An upstream annotation stage asks a language model to label every
//! experiment of a sequencing project: which gene was mutated or deleted,
//! which protein was depleted, which stress or time point applies, what the
//! ChIP target is, and whether the experiment is an input or antibody
//! control. This crate takes those structured replies and turns them into a
//! reviewable table:
//!
//! - [`validate`]: flags records whose booleans disagree with their text fields
//! - [`tag`]: derives a canonical sample label and perturbation category
//! - [`control`]: pairs each treatment with its matching control in the project
//! - [`pipeline`]: runs the stages per project and reports what needs review
//! - [`storage`]: exports the annotated table as Arrow / Parquet
//!
//! ## Example
//!
//! ```rust
//! use chip_annotate::pipeline::Annotator;
//! use chip_annotate::record::{ExperimentRecord, PerturbationClass};
//!
//! let records = vec![
//!     ExperimentRecord::builder("SRX1", "PRJNA1").chip_input(true).build(),
//!     ExperimentRecord::builder("SRX2", "PRJNA1").chip_target("H3K4me3").build(),
//!     ExperimentRecord::builder("SRX3", "PRJNA1")
//!         .chip_target("H3K4me3")
//!         .perturbed(PerturbationClass::GeneDeletion, "Swi6")
//!         .build(),
//! ];
//!
//! let table = Annotator::builder().build()?.annotate(records)?;
//!
//! let deletion = table.find("SRX3").unwrap();
//! assert_eq!(deletion.sample(), Some("H3K4me3-Swi6-gene_deletion"));
//! assert_eq!(deletion.control(), Some("none"));
//! assert_eq!(table.report().unmatched_count(), 1);
//! # Ok::<(), chip_annotate::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod control;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod storage;
pub mod tag;
pub mod validate;

pub use error::{Error, Result};
pub use pipeline::{AnnotatedTable, Annotator, AnnotatorConfig};
pub use record::{ExperimentRecord, Perturbation, PerturbationClass, NO_CONTROL};
