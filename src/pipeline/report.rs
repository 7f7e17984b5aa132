//! Annotation run report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::BalanceReport;

/// Summary of one annotation run.
///
/// Counts are taken after deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationReport {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) record_count: usize,
    pub(crate) project_count: usize,
    pub(crate) duplicate_count: usize,
    pub(crate) warning_count: usize,
    pub(crate) control_count: usize,
    pub(crate) unmatched_count: usize,
    pub(crate) balance: Vec<BalanceReport>,
}

impl AnnotationReport {
    pub(crate) fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            record_count: 0,
            project_count: 0,
            duplicate_count: 0,
            warning_count: 0,
            control_count: 0,
            unmatched_count: 0,
            balance: Vec::new(),
        }
    }

    /// When the run finished.
    #[must_use]
    pub const fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Records in the annotated table.
    #[must_use]
    pub const fn record_count(&self) -> usize {
        self.record_count
    }

    /// Distinct projects.
    #[must_use]
    pub const fn project_count(&self) -> usize {
        self.project_count
    }

    /// Repeated experiment ids dropped before processing.
    #[must_use]
    pub const fn duplicate_count(&self) -> usize {
        self.duplicate_count
    }

    /// Records flagged by the validator.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Records acting as controls.
    #[must_use]
    pub const fn control_count(&self) -> usize {
        self.control_count
    }

    /// Treatments left without a control.
    #[must_use]
    pub const fn unmatched_count(&self) -> usize {
        self.unmatched_count
    }

    /// Per-project balance reports, empty when the check is disabled.
    #[must_use]
    pub fn balance(&self) -> &[BalanceReport] {
        &self.balance
    }

    /// Projects with at least one lopsided flag.
    #[must_use]
    pub fn imbalanced_projects(&self) -> Vec<&str> {
        self.balance
            .iter()
            .filter(|b| b.any_flagged())
            .map(BalanceReport::project_id)
            .collect()
    }
}
