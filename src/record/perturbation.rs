//! Perturbation classes and the flag/descriptor lookup table

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four mutually-prioritized things an experiment can alter.
///
/// Each class owns a boolean flag on [`ExperimentRecord`](super::ExperimentRecord)
/// and a free-text descriptor naming what was altered. Tagging and control
/// matching both walk [`PerturbationClass::PRIORITY`], so the order lives in
/// exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerturbationClass {
    /// Point mutation or domain truncation (`gene_mutation` / `mutation`).
    GeneMutation,
    /// Complete removal of a gene (`gene_deletion` / `deletion`).
    GeneDeletion,
    /// Induced protein depletion (`protein_depletion` / `depletion`).
    ProteinDepletion,
    /// Chemical or environmental stress (`stress_condition` / `stress`).
    StressCondition,
}

impl PerturbationClass {
    /// Priority order used when more than one flag is set: the first true flag wins.
    pub const PRIORITY: [Self; 4] = [
        Self::GeneMutation,
        Self::GeneDeletion,
        Self::ProteinDepletion,
        Self::StressCondition,
    ];

    /// Name of the boolean flag, also used as the perturbation category.
    #[must_use]
    pub const fn flag_name(self) -> &'static str {
        match self {
            Self::GeneMutation => "gene_mutation",
            Self::GeneDeletion => "gene_deletion",
            Self::ProteinDepletion => "protein_depletion",
            Self::StressCondition => "stress_condition",
        }
    }

    /// Name of the paired descriptor field.
    #[must_use]
    pub const fn descriptor_name(self) -> &'static str {
        match self {
            Self::GeneMutation => "mutation",
            Self::GeneDeletion => "deletion",
            Self::ProteinDepletion => "depletion",
            Self::StressCondition => "stress",
        }
    }
}

impl fmt::Display for PerturbationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flag_name())
    }
}

/// Perturbation category written onto a tagged record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perturbation {
    /// `gene_mutation`
    GeneMutation,
    /// `gene_deletion`
    GeneDeletion,
    /// `protein_depletion`
    ProteinDepletion,
    /// `stress_condition`
    StressCondition,
    /// Wild type: no perturbation flag set.
    None,
}

impl Perturbation {
    /// Category string as it appears in the annotated table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GeneMutation => "gene_mutation",
            Self::GeneDeletion => "gene_deletion",
            Self::ProteinDepletion => "protein_depletion",
            Self::StressCondition => "stress_condition",
            Self::None => "none",
        }
    }

    /// The class behind this category, `None` for wild type.
    #[must_use]
    pub const fn class(self) -> Option<PerturbationClass> {
        match self {
            Self::GeneMutation => Some(PerturbationClass::GeneMutation),
            Self::GeneDeletion => Some(PerturbationClass::GeneDeletion),
            Self::ProteinDepletion => Some(PerturbationClass::ProteinDepletion),
            Self::StressCondition => Some(PerturbationClass::StressCondition),
            Self::None => None,
        }
    }

    /// True for the wild-type category.
    #[must_use]
    pub const fn is_wild_type(self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<Option<PerturbationClass>> for Perturbation {
    fn from(class: Option<PerturbationClass>) -> Self {
        match class {
            Some(PerturbationClass::GeneMutation) => Self::GeneMutation,
            Some(PerturbationClass::GeneDeletion) => Self::GeneDeletion,
            Some(PerturbationClass::ProteinDepletion) => Self::ProteinDepletion,
            Some(PerturbationClass::StressCondition) => Self::StressCondition,
            None => Self::None,
        }
    }
}

impl fmt::Display for Perturbation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (flag, descriptor) pair checked for agreement by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagPair {
    /// One of the four perturbation classes.
    Perturbation(PerturbationClass),
    /// `time_series` / `time_point`.
    TimeSeries,
}

impl FlagPair {
    /// All five pairs in table order.
    pub const ALL: [Self; 5] = [
        Self::Perturbation(PerturbationClass::GeneMutation),
        Self::Perturbation(PerturbationClass::GeneDeletion),
        Self::Perturbation(PerturbationClass::ProteinDepletion),
        Self::Perturbation(PerturbationClass::StressCondition),
        Self::TimeSeries,
    ];

    /// Flag field name.
    #[must_use]
    pub const fn flag_name(self) -> &'static str {
        match self {
            Self::Perturbation(class) => class.flag_name(),
            Self::TimeSeries => "time_series",
        }
    }

    /// Descriptor field name.
    #[must_use]
    pub const fn descriptor_name(self) -> &'static str {
        match self {
            Self::Perturbation(class) => class.descriptor_name(),
            Self::TimeSeries => "time_point",
        }
    }
}

impl fmt::Display for FlagPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.flag_name(), self.descriptor_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        let names: Vec<_> = PerturbationClass::PRIORITY
            .iter()
            .map(|c| c.flag_name())
            .collect();
        assert_eq!(
            names,
            vec!["gene_mutation", "gene_deletion", "protein_depletion", "stress_condition"]
        );
    }

    #[test]
    fn test_perturbation_from_class() {
        assert_eq!(Perturbation::from(None), Perturbation::None);
        for class in PerturbationClass::PRIORITY {
            let p = Perturbation::from(Some(class));
            assert_eq!(p.class(), Some(class));
            assert_eq!(p.as_str(), class.flag_name());
        }
    }

    #[test]
    fn test_perturbation_serde_names() {
        let json = serde_json::to_string(&Perturbation::None).unwrap();
        assert_eq!(json, "\"none\"");
        let p: Perturbation = serde_json::from_str("\"protein_depletion\"").unwrap();
        assert_eq!(p, Perturbation::ProteinDepletion);
    }

    #[test]
    fn test_flag_pair_display() {
        assert_eq!(FlagPair::TimeSeries.to_string(), "time_series/time_point");
        assert_eq!(
            FlagPair::Perturbation(PerturbationClass::StressCondition).to_string(),
            "stress_condition/stress"
        );
    }
}
