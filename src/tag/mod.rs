//! Sample tagging
//!
//! Derives a human-readable sample label and a perturbation category for each
//! record. The label is later used as the join key between treatments and
//! their controls.
//!
//! ```text
//! perturbed, time series   {target}-{value}-{perturbation}-{timepoint}
//! perturbed                {target}-{value}-{perturbation}
//! wild type, time series   {target}-WT-{timepoint}
//! wild type                {target}-WT
//! ```
//!
//! `target` is `Input` for input controls and the ChIP target otherwise.
//! Whitespace inside the time point becomes `_`.
//!
//! ```rust
//! use chip_annotate::record::ExperimentRecord;
//! use chip_annotate::tag::SampleTagger;
//!
//! let record = ExperimentRecord::builder("SRX1", "PRJNA1")
//!     .chip_input(true)
//!     .time_course("30 min")
//!     .build();
//!
//! let tag = SampleTagger::new().tag(&record)?;
//! assert_eq!(tag.sample, "Input-WT-30_min");
//! # Ok::<(), chip_annotate::Error>(())
//! ```

use crate::record::{ExperimentRecord, Perturbation};
use crate::Result;

/// Target label used for input controls.
pub const INPUT_TARGET: &str = "Input";

/// Marker for unperturbed samples.
pub const WILD_TYPE_MARKER: &str = "WT";

/// Derived sample label and category for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleTag {
    /// Canonical sample label.
    pub sample: String,
    /// Perturbation category.
    pub perturbation: Perturbation,
}

/// Sample label and perturbation category deriver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleTagger;

impl SampleTagger {
    /// Create a tagger.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Compute the tag of one record without modifying it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingField`] if the record lacks its
    /// experiment or project id.
    pub fn tag(&self, record: &ExperimentRecord) -> Result<SampleTag> {
        record.ensure_identity()?;

        let target = if record.chip_input() {
            INPUT_TARGET
        } else {
            record.chip_target()
        };
        let timepoint = record.time_series().then(|| timepoint_suffix(record));

        let class = record.active_perturbation();
        let perturbation = Perturbation::from(class);
        let mut sample = match class {
            Some(class) => format!(
                "{target}-{}-{perturbation}",
                record.descriptor(class).unwrap_or("")
            ),
            None => format!("{target}-{WILD_TYPE_MARKER}"),
        };
        if let Some(timepoint) = timepoint {
            sample.push('-');
            sample.push_str(&timepoint);
        }

        Ok(SampleTag {
            sample,
            perturbation,
        })
    }

    /// Tag one record in place.
    ///
    /// # Errors
    ///
    /// See [`SampleTagger::tag`].
    pub fn apply(&self, record: &mut ExperimentRecord) -> Result<()> {
        let SampleTag {
            sample,
            perturbation,
        } = self.tag(record)?;
        record.set_tag(sample, perturbation);
        Ok(())
    }

    /// Tag every record in place, stopping at the first malformed one.
    ///
    /// # Errors
    ///
    /// See [`SampleTagger::tag`].
    pub fn apply_all(&self, records: &mut [ExperimentRecord]) -> Result<()> {
        records.iter_mut().try_for_each(|record| self.apply(record))
    }
}

fn timepoint_suffix(record: &ExperimentRecord) -> String {
    record
        .time_point()
        .unwrap_or("")
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}
