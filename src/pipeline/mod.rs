//! Annotation pipeline
//!
//! Runs the post-processing stages over a batch of annotated experiments:
//!
//! ```text
//! records ──> dedupe ──> RecordValidator ──> group by project
//!                                                 │
//!                    ┌────────────────────────────┘  (one task per project)
//!                    ▼
//!             SampleTagger ──> ControlResolver ──> balance check
//!                    │
//!                    ▼
//!             AnnotatedTable + AnnotationReport
//! ```
//!
//! Projects share no state, so with the `rayon` feature they are processed in
//! parallel. The output keeps projects in order of first appearance.
//!
//! ```rust
//! use chip_annotate::pipeline::Annotator;
//! use chip_annotate::record::ExperimentRecord;
//!
//! let records = vec![
//!     ExperimentRecord::builder("SRX1", "PRJNA1").chip_input(true).build(),
//!     ExperimentRecord::builder("SRX2", "PRJNA1").chip_target("H3K4me3").build(),
//! ];
//!
//! let table = Annotator::builder().build()?.annotate(records)?;
//! let treatment = table.find("SRX2").unwrap();
//! assert_eq!(treatment.sample(), Some("H3K4me3-WT"));
//! assert_eq!(treatment.control(), Some("Input-WT"));
//! # Ok::<(), chip_annotate::Error>(())
//! ```

mod report;

pub use report::AnnotationReport;

use std::path::Path;

use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::control::{ControlKind, ControlResolver, TieBreak};
use crate::record::{
    group_by_project, ExperimentRecord, ProjectAnnotation, ProjectGroup, NO_CONTROL,
};
use crate::storage;
use crate::tag::SampleTagger;
use crate::validate::{
    balance_check, BalanceReport, RecordValidator, DEFAULT_BALANCE_THRESHOLD,
};
use crate::{Error, Result};

/// Pipeline configuration.
///
/// Passed explicitly to [`Annotator`]; there is no global state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    /// Run the flag/descriptor validator.
    pub validate: bool,
    /// Run the sample tagger and control resolver.
    pub tag: bool,
    /// Choice among several qualifying controls.
    pub tie_break: TieBreak,
    /// Balance threshold, `None` disables the balance check.
    pub balance_threshold: Option<f64>,
    /// Drop repeated experiment ids, keeping the first.
    pub deduplicate: bool,
    /// Process projects in parallel (needs the `rayon` feature).
    pub parallel: bool,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            validate: true,
            tag: true,
            tie_break: TieBreak::default(),
            balance_threshold: Some(DEFAULT_BALANCE_THRESHOLD),
            deduplicate: true,
            parallel: true,
        }
    }
}

/// Annotator builder
#[derive(Debug, Default)]
pub struct AnnotatorBuilder {
    config: AnnotatorConfig,
}

impl AnnotatorBuilder {
    /// Enable or disable the validator.
    #[must_use]
    pub const fn validate(mut self, validate: bool) -> Self {
        self.config.validate = validate;
        self
    }

    /// Enable or disable tagging and control matching.
    #[must_use]
    pub const fn tag(mut self, tag: bool) -> Self {
        self.config.tag = tag;
        self
    }

    /// Set the tie-break policy.
    #[must_use]
    pub const fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.config.tie_break = tie_break;
        self
    }

    /// Set the balance threshold, `None` to skip the balance check.
    #[must_use]
    pub fn balance_threshold(mut self, threshold: Option<f64>) -> Self {
        self.config.balance_threshold = threshold;
        self
    }

    /// Enable or disable deduplication by experiment id.
    #[must_use]
    pub const fn deduplicate(mut self, deduplicate: bool) -> Self {
        self.config.deduplicate = deduplicate;
        self
    }

    /// Enable or disable parallel per-project processing.
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Build the annotator
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the balance threshold is outside `(0, 1]`
    pub fn build(self) -> Result<Annotator> {
        Annotator::new(self.config)
    }
}

/// Runs validation, tagging and control matching over annotated records.
#[derive(Debug, Clone)]
pub struct Annotator {
    config: AnnotatorConfig,
    validator: RecordValidator,
    tagger: SampleTagger,
    resolver: ControlResolver,
}

struct ProjectOutcome {
    records: Vec<ExperimentRecord>,
    balance: Option<BalanceReport>,
    controls: usize,
    unmatched: usize,
}

impl Annotator {
    /// Create a new annotator builder
    #[must_use]
    pub fn builder() -> AnnotatorBuilder {
        AnnotatorBuilder::default()
    }

    /// Create an annotator from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the balance threshold is outside `(0, 1]`
    pub fn new(config: AnnotatorConfig) -> Result<Self> {
        if let Some(threshold) = config.balance_threshold {
            if !(threshold > 0.0 && threshold <= 1.0) {
                return Err(Error::InvalidInput(format!(
                    "balance threshold must be in (0, 1], got {threshold}"
                )));
            }
        }
        Ok(Self {
            config,
            validator: RecordValidator::new(),
            tagger: SampleTagger::new(),
            resolver: ControlResolver::new(config.tie_break),
        })
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Annotate the replies of several projects.
    ///
    /// # Errors
    ///
    /// See [`Annotator::annotate`].
    pub fn annotate_projects(&self, projects: Vec<ProjectAnnotation>) -> Result<AnnotatedTable> {
        let records = projects
            .into_iter()
            .flat_map(ProjectAnnotation::into_records)
            .collect();
        self.annotate(records)
    }

    /// Annotate a batch of records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] when a record lacks its experiment or
    /// project id, and [`Error::DuplicateExperiment`] when deduplication is
    /// disabled and an id repeats within a project.
    pub fn annotate(&self, records: Vec<ExperimentRecord>) -> Result<AnnotatedTable> {
        let mut report = AnnotationReport::new();

        for record in &records {
            record.ensure_identity()?;
        }

        let mut records = if self.config.deduplicate {
            let before = records.len();
            let records = deduplicate(records);
            report.duplicate_count = before - records.len();
            records
        } else {
            records
        };

        if self.config.validate {
            for record in &mut records {
                let validation = self.validator.apply(record);
                if validation.is_warning() {
                    let mismatches: Vec<String> =
                        validation.mismatches().iter().map(ToString::to_string).collect();
                    warn!(
                        experiment_id = record.experiment_id(),
                        project_id = record.project_id(),
                        mismatches = ?mismatches,
                        mutation_and_deletion = validation.mutation_and_deletion(),
                        "record needs review"
                    );
                    report.warning_count += 1;
                }
            }
        }

        let groups = group_by_project(records);
        report.project_count = groups.len();

        let outcomes = self.run_projects(groups)?;

        let mut records = Vec::with_capacity(outcomes.iter().map(|o| o.records.len()).sum());
        for outcome in outcomes {
            report.control_count += outcome.controls;
            report.unmatched_count += outcome.unmatched;
            report.balance.extend(outcome.balance);
            records.extend(outcome.records);
        }
        report.record_count = records.len();

        info!(
            records = report.record_count,
            projects = report.project_count,
            warnings = report.warning_count,
            unmatched = report.unmatched_count,
            "annotation complete"
        );

        Ok(AnnotatedTable { records, report })
    }

    #[cfg(feature = "rayon")]
    fn run_projects(&self, groups: Vec<ProjectGroup>) -> Result<Vec<ProjectOutcome>> {
        use rayon::prelude::*;

        if self.config.parallel {
            groups
                .into_par_iter()
                .map(|group| self.process_project(group))
                .collect()
        } else {
            groups
                .into_iter()
                .map(|group| self.process_project(group))
                .collect()
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn run_projects(&self, groups: Vec<ProjectGroup>) -> Result<Vec<ProjectOutcome>> {
        groups
            .into_iter()
            .map(|group| self.process_project(group))
            .collect()
    }

    fn process_project(&self, group: ProjectGroup) -> Result<ProjectOutcome> {
        let project_id = group.project_id().to_string();
        let mut records = group.into_records();
        debug!(project_id = %project_id, records = records.len(), "processing project");

        let balance = self
            .config
            .balance_threshold
            .map(|threshold| balance_check(&project_id, &records, threshold))
            .transpose()?;
        if let Some(report) = balance.as_ref().filter(|b| b.any_flagged()) {
            let flags: Vec<&str> = report
                .flags()
                .iter()
                .filter(|f| f.imbalanced)
                .map(|f| f.flag.as_str())
                .collect();
            warn!(project_id = %project_id, flags = ?flags, "imbalanced flags");
        }

        if !self.config.tag {
            return Ok(ProjectOutcome {
                records,
                balance,
                controls: 0,
                unmatched: 0,
            });
        }

        self.tagger.apply_all(&mut records)?;
        let kind = ControlKind::of(&records);
        let controls = records.iter().filter(|r| kind.is_control(r)).count();
        let records = self.resolver.resolve(records)?;

        let unmatched = records
            .iter()
            .filter(|r| r.control() == Some(NO_CONTROL))
            .inspect(|r| {
                warn!(
                    experiment_id = r.experiment_id(),
                    project_id = %project_id,
                    sample = r.sample().unwrap_or(""),
                    "no matching control"
                );
            })
            .count();

        Ok(ProjectOutcome {
            records,
            balance,
            controls,
            unmatched,
        })
    }
}

fn deduplicate(records: Vec<ExperimentRecord>) -> Vec<ExperimentRecord> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    records
        .into_iter()
        .filter(|record| {
            let fresh = seen.insert(record.experiment_id().to_string());
            if !fresh {
                debug!(experiment_id = record.experiment_id(), "dropping duplicate experiment");
            }
            fresh
        })
        .collect()
}

/// Output of an annotation run: the augmented records plus a report.
#[derive(Debug, Clone)]
pub struct AnnotatedTable {
    records: Vec<ExperimentRecord>,
    report: AnnotationReport,
}

impl AnnotatedTable {
    /// Annotated records, grouped by project.
    #[must_use]
    pub fn records(&self) -> &[ExperimentRecord] {
        &self.records
    }

    /// Run report.
    #[must_use]
    pub const fn report(&self) -> &AnnotationReport {
        &self.report
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by experiment id.
    #[must_use]
    pub fn find(&self, experiment_id: &str) -> Option<&ExperimentRecord> {
        self.records
            .iter()
            .find(|r| r.experiment_id() == experiment_id)
    }

    /// Consume the table, returning its records.
    #[must_use]
    pub fn into_records(self) -> Vec<ExperimentRecord> {
        self.records
    }

    /// Full table as an Arrow record batch.
    ///
    /// # Errors
    ///
    /// Returns error if the batch cannot be assembled
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        storage::to_record_batch(&self.records)
    }

    /// Summary columns only (see [`storage::SUMMARY_COLUMNS`]).
    ///
    /// # Errors
    ///
    /// Returns error if the batch cannot be assembled
    pub fn summary_batch(&self) -> Result<RecordBatch> {
        storage::summary_batch(&self.records)
    }

    /// Write the full table to a Parquet file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or written
    pub fn write_parquet<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        storage::write_parquet(path, &self.to_record_batch()?)
    }
}
