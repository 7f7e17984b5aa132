//! Per-project flag balance check
//!
//! Within a project the annotation of a flag is expected to split the
//! experiments into sizeable groups. When only one or two experiments carry a
//! flag that everything else lacks (or vice versa) the minority is often a
//! mislabel, so the flag is reported for review.

use serde::{Deserialize, Serialize};

use crate::record::{ExperimentRecord, FlagPair};
use crate::{Error, Result};

/// Minority-to-majority ratio at or below which a flag is reported.
pub const DEFAULT_BALANCE_THRESHOLD: f64 = 0.3;

/// True/false counts of one flag within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagBalance {
    /// Flag field name.
    pub flag: String,
    /// Records with the flag set.
    pub true_count: usize,
    /// Records with the flag clear.
    pub false_count: usize,
    /// The split is lopsided.
    pub imbalanced: bool,
}

/// Balance of all five flags for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    project_id: String,
    threshold: f64,
    flags: Vec<FlagBalance>,
}

impl BalanceReport {
    /// Get the project ID.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Threshold the report was computed with.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Per-flag counts in table order.
    #[must_use]
    pub fn flags(&self) -> &[FlagBalance] {
        &self.flags
    }

    /// Balance entry of one flag by name.
    #[must_use]
    pub fn flag(&self, name: &str) -> Option<&FlagBalance> {
        self.flags.iter().find(|f| f.flag == name)
    }

    /// At least one flag is lopsided.
    #[must_use]
    pub fn any_flagged(&self) -> bool {
        self.flags.iter().any(|f| f.imbalanced)
    }
}

/// Count each flag within one project's records.
///
/// A flag is imbalanced when both counts are non-zero and
/// `min / max <= threshold`. A flag that is uniformly set or uniformly clear
/// is not reported: projects without any mutant are normal.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `threshold` is not in `(0, 1]`.
#[allow(clippy::cast_precision_loss)]
pub fn balance_check(
    project_id: &str,
    records: &[ExperimentRecord],
    threshold: f64,
) -> Result<BalanceReport> {
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(Error::InvalidInput(format!(
            "balance threshold must be in (0, 1], got {threshold}"
        )));
    }

    let flags = FlagPair::ALL
        .into_iter()
        .map(|pair| {
            let true_count = records.iter().filter(|r| r.pair(pair).0).count();
            let false_count = records.len() - true_count;
            let (minority, majority) = if true_count <= false_count {
                (true_count, false_count)
            } else {
                (false_count, true_count)
            };
            let imbalanced =
                minority > 0 && (minority as f64 / majority as f64) <= threshold;
            FlagBalance {
                flag: pair.flag_name().to_string(),
                true_count,
                false_count,
                imbalanced,
            }
        })
        .collect();

    Ok(BalanceReport {
        project_id: project_id.to_string(),
        threshold,
        flags,
    })
}
