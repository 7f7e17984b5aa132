//! Project-level grouping and the annotation reply shape

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::ExperimentRecord;
use crate::Result;

/// All experiments of one project, in their incoming row order.
///
/// Control matching is a whole-group operation, so a project is always
/// materialized before the resolver sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectGroup {
    project_id: String,
    records: Vec<ExperimentRecord>,
}

impl ProjectGroup {
    /// Create an empty group for a project.
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            records: Vec::new(),
        }
    }

    /// Get the project ID.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Get the records of the group.
    #[must_use]
    pub fn records(&self) -> &[ExperimentRecord] {
        &self.records
    }

    /// Number of records in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the group holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record.
    pub fn push(&mut self, record: ExperimentRecord) {
        self.records.push(record);
    }

    /// Consume the group, returning its records.
    #[must_use]
    pub fn into_records(self) -> Vec<ExperimentRecord> {
        self.records
    }
}

/// Split records into per-project groups.
///
/// Projects appear in order of first appearance, and rows keep their relative
/// order inside each project.
#[must_use]
pub fn group_by_project(records: Vec<ExperimentRecord>) -> Vec<ProjectGroup> {
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut groups: Vec<ProjectGroup> = Vec::new();

    for record in records {
        let slot = match index.get(record.project_id()) {
            Some(&slot) => slot,
            None => {
                index.insert(record.project_id().to_string(), groups.len());
                groups.push(ProjectGroup::new(record.project_id()));
                groups.len() - 1
            }
        };
        groups[slot].push(record);
    }

    groups
}

/// Structured reply of the annotation stage for one project.
///
/// Matches the JSON the LLM-parsing collaborator emits: project identity plus
/// one object per experiment (`experimentMeta` is accepted as an alias of
/// `experiments`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectAnnotation {
    /// Archive project accession.
    pub project_id: String,
    /// Project title.
    #[serde(default)]
    pub project_title: String,
    /// Model that produced the annotation.
    #[serde(default)]
    pub model: Option<String>,
    /// Per-experiment annotations.
    #[serde(alias = "experimentMeta")]
    pub experiments: Vec<ExperimentRecord>,
}

impl ProjectAnnotation {
    /// Parse one project reply.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if the reply is malformed or an
    /// experiment is missing a required flag.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Flatten into records, stamping each with the project id and model.
    #[must_use]
    pub fn into_records(self) -> Vec<ExperimentRecord> {
        let Self {
            project_id,
            model,
            experiments,
            ..
        } = self;
        experiments
            .into_iter()
            .map(|mut record| {
                record.set_project_id(&project_id);
                record.set_model(model.as_deref());
                record
            })
            .collect()
    }
}
