//! Experiment Record - one annotated ChIP-seq experiment

use serde::{Deserialize, Serialize};

use super::{FlagPair, Perturbation, PerturbationClass};
use crate::{Error, Result};

/// Sentinel written to `control` when no control could be resolved.
pub const NO_CONTROL: &str = "none";

/// Experiment Record represents one sequencing experiment.
///
/// The labelled fields (flags, descriptors, `chip_target`) come from the
/// annotation stage and are never altered afterwards. The derived fields
/// (`warning`, `sample`, `perturbation`, `control`, `control_id`) start out
/// unset and are filled in by the validator, tagger and control resolver.
/// They are serialized but never read back from input.
///
/// Descriptors are optional: an absent value, `null`, `""` and a
/// whitespace-only string all read as "empty".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExperimentRecord {
    experiment_id: String,
    #[serde(default)]
    project_id: String,
    #[serde(default, alias = "exp_title")]
    title: String,

    gene_mutation: bool,
    gene_deletion: bool,
    protein_depletion: bool,
    stress_condition: bool,
    time_series: bool,
    chip_input: bool,
    antibody_control: bool,

    #[serde(default)]
    chip_target: Option<String>,
    #[serde(default)]
    mutation: Option<String>,
    #[serde(default)]
    deletion: Option<String>,
    #[serde(default)]
    depletion: Option<String>,
    #[serde(default)]
    stress: Option<String>,
    #[serde(default)]
    time_point: Option<String>,

    #[serde(default)]
    model: Option<String>,

    #[serde(skip_deserializing)]
    warning: bool,
    #[serde(skip_deserializing)]
    sample: Option<String>,
    #[serde(skip_deserializing)]
    perturbation: Option<Perturbation>,
    #[serde(skip_deserializing)]
    control: Option<String>,
    #[serde(skip_deserializing)]
    control_id: Option<String>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

impl ExperimentRecord {
    /// Create a wild-type, non-control record with every flag false.
    #[must_use]
    pub fn new(experiment_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        ExperimentRecordBuilder::new(experiment_id, project_id).build()
    }

    /// Create a builder for constructing a record with labelled fields.
    #[must_use]
    pub fn builder(
        experiment_id: impl Into<String>,
        project_id: impl Into<String>,
    ) -> ExperimentRecordBuilder {
        ExperimentRecordBuilder::new(experiment_id, project_id)
    }

    /// Get the experiment ID.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the project ID.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Get the experiment title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Get the model that produced the annotation, if recorded.
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Whether the experiment is marked as part of a time series.
    #[must_use]
    pub const fn time_series(&self) -> bool {
        self.time_series
    }

    /// Whether the experiment is a ChIP input control.
    #[must_use]
    pub const fn chip_input(&self) -> bool {
        self.chip_input
    }

    /// Whether the experiment is a non-specific antibody (IgG) control.
    #[must_use]
    pub const fn antibody_control(&self) -> bool {
        self.antibody_control
    }

    /// Get the ChIP target, empty when not supplied.
    #[must_use]
    pub fn chip_target(&self) -> &str {
        self.chip_target.as_deref().unwrap_or("")
    }

    /// Get the boolean flag of a perturbation class.
    #[must_use]
    pub const fn flag(&self, class: PerturbationClass) -> bool {
        match class {
            PerturbationClass::GeneMutation => self.gene_mutation,
            PerturbationClass::GeneDeletion => self.gene_deletion,
            PerturbationClass::ProteinDepletion => self.protein_depletion,
            PerturbationClass::StressCondition => self.stress_condition,
        }
    }

    /// Get the descriptor of a perturbation class, `None` when empty or blank.
    #[must_use]
    pub fn descriptor(&self, class: PerturbationClass) -> Option<&str> {
        let raw = match class {
            PerturbationClass::GeneMutation => self.mutation.as_ref(),
            PerturbationClass::GeneDeletion => self.deletion.as_ref(),
            PerturbationClass::ProteinDepletion => self.depletion.as_ref(),
            PerturbationClass::StressCondition => self.stress.as_ref(),
        };
        non_blank(raw)
    }

    /// Get the time point, `None` when empty or blank.
    #[must_use]
    pub fn time_point(&self) -> Option<&str> {
        non_blank(self.time_point.as_ref())
    }

    /// Flag and descriptor of one validator pair.
    #[must_use]
    pub fn pair(&self, pair: FlagPair) -> (bool, Option<&str>) {
        match pair {
            FlagPair::Perturbation(class) => (self.flag(class), self.descriptor(class)),
            FlagPair::TimeSeries => (self.time_series, self.time_point()),
        }
    }

    /// First perturbation class whose flag is set, in priority order.
    #[must_use]
    pub fn active_perturbation(&self) -> Option<PerturbationClass> {
        PerturbationClass::PRIORITY
            .into_iter()
            .find(|&class| self.flag(class))
    }

    /// True when none of the four perturbation flags is set.
    #[must_use]
    pub fn is_unperturbed(&self) -> bool {
        self.active_perturbation().is_none()
    }

    /// Validator verdict, `false` until the validator has run.
    #[must_use]
    pub const fn warning(&self) -> bool {
        self.warning
    }

    /// Canonical sample label, set by the tagger.
    #[must_use]
    pub fn sample(&self) -> Option<&str> {
        self.sample.as_deref()
    }

    /// Perturbation category, set by the tagger.
    #[must_use]
    pub const fn perturbation(&self) -> Option<Perturbation> {
        self.perturbation
    }

    /// Sample label of the matched control, or [`NO_CONTROL`].
    ///
    /// `None` on control records and on records the resolver has not seen.
    #[must_use]
    pub fn control(&self) -> Option<&str> {
        self.control.as_deref()
    }

    /// Experiment ID of the matched control.
    #[must_use]
    pub fn control_id(&self) -> Option<&str> {
        self.control_id.as_deref()
    }

    /// Fail fast when an identity field is missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if `experiment_id` or `project_id` is blank.
    pub fn ensure_identity(&self) -> Result<()> {
        if self.experiment_id.trim().is_empty() {
            return Err(Error::MissingField {
                experiment_id: "<blank>".to_string(),
                field: "experiment_id",
            });
        }
        if self.project_id.trim().is_empty() {
            return Err(Error::MissingField {
                experiment_id: self.experiment_id.clone(),
                field: "project_id",
            });
        }
        Ok(())
    }

    pub(crate) fn set_project_id(&mut self, project_id: &str) {
        project_id.clone_into(&mut self.project_id);
    }

    pub(crate) fn set_model(&mut self, model: Option<&str>) {
        if let Some(model) = model {
            self.model = Some(model.to_string());
        }
    }

    pub(crate) fn set_warning(&mut self, warning: bool) {
        self.warning = warning;
    }

    pub(crate) fn set_tag(&mut self, sample: String, perturbation: Perturbation) {
        self.sample = Some(sample);
        self.perturbation = Some(perturbation);
    }

    pub(crate) fn set_control(&mut self, matched: Option<&Self>) {
        match matched {
            Some(control) => {
                let label = control.sample().unwrap_or(control.experiment_id());
                self.control = Some(label.to_string());
                self.control_id = Some(control.experiment_id.clone());
            }
            None => {
                self.control = Some(NO_CONTROL.to_string());
                self.control_id = None;
            }
        }
    }
}

/// Builder for `ExperimentRecord`.
#[derive(Debug)]
pub struct ExperimentRecordBuilder {
    record: ExperimentRecord,
}

impl ExperimentRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(experiment_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            record: ExperimentRecord {
                experiment_id: experiment_id.into(),
                project_id: project_id.into(),
                title: String::new(),
                gene_mutation: false,
                gene_deletion: false,
                protein_depletion: false,
                stress_condition: false,
                time_series: false,
                chip_input: false,
                antibody_control: false,
                chip_target: None,
                mutation: None,
                deletion: None,
                depletion: None,
                stress: None,
                time_point: None,
                model: None,
                warning: false,
                sample: None,
                perturbation: None,
                control: None,
                control_id: None,
            },
        }
    }

    /// Set the experiment title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.record.title = title.into();
        self
    }

    /// Set the ChIP target.
    #[must_use]
    pub fn chip_target(mut self, target: impl Into<String>) -> Self {
        self.record.chip_target = Some(target.into());
        self
    }

    /// Mark the record as an input control.
    #[must_use]
    pub const fn chip_input(mut self, chip_input: bool) -> Self {
        self.record.chip_input = chip_input;
        self
    }

    /// Mark the record as an antibody control.
    #[must_use]
    pub const fn antibody_control(mut self, antibody_control: bool) -> Self {
        self.record.antibody_control = antibody_control;
        self
    }

    /// Set one perturbation flag without touching its descriptor.
    #[must_use]
    pub const fn flag(mut self, class: PerturbationClass, value: bool) -> Self {
        match class {
            PerturbationClass::GeneMutation => self.record.gene_mutation = value,
            PerturbationClass::GeneDeletion => self.record.gene_deletion = value,
            PerturbationClass::ProteinDepletion => self.record.protein_depletion = value,
            PerturbationClass::StressCondition => self.record.stress_condition = value,
        }
        self
    }

    /// Set one descriptor without touching its flag.
    #[must_use]
    pub fn descriptor(mut self, class: PerturbationClass, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match class {
            PerturbationClass::GeneMutation => self.record.mutation = value,
            PerturbationClass::GeneDeletion => self.record.deletion = value,
            PerturbationClass::ProteinDepletion => self.record.depletion = value,
            PerturbationClass::StressCondition => self.record.stress = value,
        }
        self
    }

    /// Set a perturbation flag and its descriptor together.
    #[must_use]
    pub fn perturbed(self, class: PerturbationClass, value: impl Into<String>) -> Self {
        self.flag(class, true).descriptor(class, value)
    }

    /// Set the `time_series` flag without touching `time_point`.
    #[must_use]
    pub const fn time_series(mut self, time_series: bool) -> Self {
        self.record.time_series = time_series;
        self
    }

    /// Set `time_point` without touching the `time_series` flag.
    #[must_use]
    pub fn time_point(mut self, time_point: impl Into<String>) -> Self {
        self.record.time_point = Some(time_point.into());
        self
    }

    /// Mark the record as part of a time series at the given point.
    #[must_use]
    pub fn time_course(self, time_point: impl Into<String>) -> Self {
        self.time_series(true).time_point(time_point)
    }

    /// Set the model that produced the annotation.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.record.model = Some(model.into());
        self
    }

    /// Build the `ExperimentRecord`.
    #[must_use]
    pub fn build(self) -> ExperimentRecord {
        self.record
    }
}
