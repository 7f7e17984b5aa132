//! Control matching
//!
//! Within one project, decides which experiments are controls and pairs every
//! other experiment with the control it should be normalized against.
//!
//! ## Partition
//!
//! - any input controls: inputs are the controls, everything else is a treatment
//! - no inputs but antibody controls: antibody controls are the controls
//! - neither: no controls, every treatment resolves to [`NO_CONTROL`]
//!
//! ## Matching
//!
//! A wild-type treatment matches controls without any perturbation flag. A
//! perturbed treatment matches controls whose descriptor for the treatment's
//! active perturbation class is equal ignoring case. Time-series treatments
//! additionally require an identical time point.
//!
//! When several controls qualify, [`TieBreak`] picks one.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::{ExperimentRecord, PerturbationClass, NO_CONTROL};
use crate::{Error, Result};

/// Choice among several qualifying controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Control with the smallest experiment id. Independent of row order.
    #[default]
    LowestExperimentId,
    /// First control in the group's row order.
    FirstInGroup,
}

/// Which records of a group act as controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    /// ChIP input samples.
    Input,
    /// Non-specific antibody samples.
    Antibody,
    /// The project has no controls.
    Absent,
}

impl ControlKind {
    /// Decide the control kind of a project.
    #[must_use]
    pub fn of(records: &[ExperimentRecord]) -> Self {
        if records.iter().any(ExperimentRecord::chip_input) {
            Self::Input
        } else if records.iter().any(ExperimentRecord::antibody_control) {
            Self::Antibody
        } else {
            Self::Absent
        }
    }

    /// Whether a record belongs to the control side.
    #[must_use]
    pub const fn is_control(self, record: &ExperimentRecord) -> bool {
        match self {
            Self::Input => record.chip_input(),
            Self::Antibody => record.antibody_control(),
            Self::Absent => false,
        }
    }
}

/// Assigns each treatment its matching control.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlResolver {
    tie_break: TieBreak,
}

impl ControlResolver {
    /// Create a resolver with the given tie-break policy.
    #[must_use]
    pub const fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }

    /// Tie-break policy in use.
    #[must_use]
    pub const fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Split a project into `(treatments, controls)`, both in row order.
    #[must_use]
    pub fn partition(
        records: Vec<ExperimentRecord>,
    ) -> (Vec<ExperimentRecord>, Vec<ExperimentRecord>) {
        let kind = ControlKind::of(&records);
        records.into_iter().partition(|r| !kind.is_control(r))
    }

    /// Whether `control` qualifies as a control for `treatment`.
    ///
    /// Untagged records never match, on either side.
    #[must_use]
    pub fn matches(treatment: &ExperimentRecord, control: &ExperimentRecord) -> bool {
        let Some(perturbation) = treatment.perturbation() else {
            return false;
        };
        if control.sample().is_none() {
            return false;
        }

        let condition = match perturbation.class() {
            None => control.is_unperturbed(),
            Some(class) => descriptors_match(treatment, control, class),
        };

        condition && (!treatment.time_series() || treatment.time_point() == control.time_point())
    }

    /// Pick the control for one treatment, `None` when nothing qualifies.
    #[must_use]
    pub fn select<'a>(
        &self,
        treatment: &ExperimentRecord,
        controls: &'a [ExperimentRecord],
    ) -> Option<&'a ExperimentRecord> {
        let mut candidates = controls.iter().filter(|c| Self::matches(treatment, c));
        match self.tie_break {
            TieBreak::FirstInGroup => candidates.next(),
            TieBreak::LowestExperimentId => {
                candidates.min_by(|a, b| a.experiment_id().cmp(b.experiment_id()))
            }
        }
    }

    /// Resolve controls for one project.
    ///
    /// Returns the treatments, each with `control` set, followed by the
    /// untouched controls.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] for a record without identity,
    /// [`Error::ProjectMismatch`] when the group spans projects and
    /// [`Error::DuplicateExperiment`] when an experiment id repeats.
    pub fn resolve(&self, records: Vec<ExperimentRecord>) -> Result<Vec<ExperimentRecord>> {
        check_group(&records)?;

        let (mut treatments, controls) = Self::partition(records);
        for treatment in &mut treatments {
            let matched = self.select(treatment, &controls);
            debug!(
                experiment_id = treatment.experiment_id(),
                control = matched.map_or(NO_CONTROL, ExperimentRecord::experiment_id),
                "control resolved"
            );
            treatment.set_control(matched);
        }

        treatments.extend(controls);
        Ok(treatments)
    }
}

fn descriptors_match(
    treatment: &ExperimentRecord,
    control: &ExperimentRecord,
    class: PerturbationClass,
) -> bool {
    let wanted = treatment.descriptor(class).unwrap_or("").to_lowercase();
    let found = control.descriptor(class).unwrap_or("").to_lowercase();
    wanted == found
}

fn check_group(records: &[ExperimentRecord]) -> Result<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    let project_id = first.project_id();
    let mut seen: FxHashSet<&str> = FxHashSet::default();

    for record in records {
        record.ensure_identity()?;
        if record.project_id() != project_id {
            return Err(Error::ProjectMismatch {
                expected: project_id.to_string(),
                found: record.project_id().to_string(),
            });
        }
        if !seen.insert(record.experiment_id()) {
            return Err(Error::DuplicateExperiment {
                project_id: project_id.to_string(),
                experiment_id: record.experiment_id().to_string(),
            });
        }
    }
    Ok(())
}
