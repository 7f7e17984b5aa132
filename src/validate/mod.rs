//! Record validation
//!
//! Checks that every boolean flag agrees with its paired descriptor:
//!
//! | flag                | descriptor   |
//! |---------------------|--------------|
//! | `gene_mutation`     | `mutation`   |
//! | `gene_deletion`     | `deletion`   |
//! | `protein_depletion` | `depletion`  |
//! | `stress_condition`  | `stress`     |
//! | `time_series`       | `time_point` |
//!
//! A pair disagrees when the flag is set with an empty descriptor, or the flag
//! is clear while the descriptor holds text. A record is also flagged when it
//! claims both a mutation and a deletion. Flagged records stay in the table
//! with `warning = true` for human review.

mod balance;

pub use balance::{balance_check, BalanceReport, FlagBalance, DEFAULT_BALANCE_THRESHOLD};

use crate::record::{ExperimentRecord, FlagPair, PerturbationClass};

/// Outcome of checking one record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
    mismatches: Vec<FlagPair>,
    mutation_and_deletion: bool,
}

impl Validation {
    /// Pairs whose flag and descriptor disagree.
    #[must_use]
    pub fn mismatches(&self) -> &[FlagPair] {
        &self.mismatches
    }

    /// Both `gene_mutation` and `gene_deletion` are set.
    #[must_use]
    pub const fn mutation_and_deletion(&self) -> bool {
        self.mutation_and_deletion
    }

    /// The record needs review.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        !self.mismatches.is_empty() || self.mutation_and_deletion
    }
}

/// Flag/descriptor consistency checker.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordValidator;

impl RecordValidator {
    /// Create a validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Check one record without modifying it.
    #[must_use]
    pub fn check(&self, record: &ExperimentRecord) -> Validation {
        let mismatches = FlagPair::ALL
            .into_iter()
            .filter(|&pair| {
                let (flag, descriptor) = record.pair(pair);
                flag != descriptor.is_some()
            })
            .collect();

        Validation {
            mismatches,
            mutation_and_deletion: record.flag(PerturbationClass::GeneMutation)
                && record.flag(PerturbationClass::GeneDeletion),
        }
    }

    /// Check one record and write its `warning` field.
    pub fn apply(&self, record: &mut ExperimentRecord) -> Validation {
        let validation = self.check(record);
        record.set_warning(validation.is_warning());
        validation
    }

    /// Check every record, returning how many were flagged.
    pub fn apply_all(&self, records: &mut [ExperimentRecord]) -> usize {
        records
            .iter_mut()
            .map(|record| self.apply(record))
            .filter(Validation::is_warning)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistent_record_passes() {
        let record = ExperimentRecord::builder("SRX1", "PRJ")
            .perturbed(PerturbationClass::StressCondition, "heat shock")
            .time_course("30 min")
            .build();
        let validation = RecordValidator::new().check(&record);
        assert!(!validation.is_warning());
        assert!(validation.mismatches().is_empty());
    }

    #[test]
    fn test_flag_without_descriptor() {
        let record = ExperimentRecord::builder("SRX1", "PRJ")
            .flag(PerturbationClass::ProteinDepletion, true)
            .build();
        let validation = RecordValidator::new().check(&record);
        assert_eq!(
            validation.mismatches(),
            &[FlagPair::Perturbation(PerturbationClass::ProteinDepletion)]
        );
    }

    #[test]
    fn test_descriptor_without_flag() {
        let record = ExperimentRecord::builder("SRX1", "PRJ").time_point("G1").build();
        let validation = RecordValidator::new().check(&record);
        assert_eq!(validation.mismatches(), &[FlagPair::TimeSeries]);
    }

    #[test]
    fn test_mutation_and_deletion_conflict() {
        let record = ExperimentRecord::builder("SRX1", "PRJ")
            .perturbed(PerturbationClass::GeneMutation, "H3-K4R")
            .perturbed(PerturbationClass::GeneDeletion, "Set1")
            .build();
        let validation = RecordValidator::new().check(&record);
        assert!(validation.mismatches().is_empty());
        assert!(validation.mutation_and_deletion());
        assert!(validation.is_warning());
    }

    #[test]
    fn test_apply_all_counts_warnings() {
        let mut records = vec![
            ExperimentRecord::new("SRX1", "PRJ"),
            ExperimentRecord::builder("SRX2", "PRJ").time_series(true).build(),
        ];
        let flagged = RecordValidator::new().apply_all(&mut records);
        assert_eq!(flagged, 1);
        assert!(!records[0].warning());
        assert!(records[1].warning());
    }
}
