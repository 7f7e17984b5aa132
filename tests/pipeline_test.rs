//! Annotator pipeline tests

use chip_annotate::control::TieBreak;
use chip_annotate::pipeline::{Annotator, AnnotatorConfig};
use chip_annotate::record::{ExperimentRecord, Perturbation, PerturbationClass, ProjectAnnotation};
use chip_annotate::{Error, NO_CONTROL};

fn two_projects() -> Vec<ExperimentRecord> {
    vec![
        ExperimentRecord::builder("SRX10", "PRJA").chip_input(true).build(),
        ExperimentRecord::builder("SRX20", "PRJB")
            .antibody_control(true)
            .chip_target("IgG")
            .build(),
        ExperimentRecord::builder("SRX11", "PRJA")
            .chip_target("H3K4me3")
            .build(),
        ExperimentRecord::builder("SRX21", "PRJB")
            .chip_target("Rap1")
            .perturbed(PerturbationClass::GeneDeletion, "Sir3")
            .build(),
        ExperimentRecord::builder("SRX12", "PRJA")
            .chip_target("H3K4me3")
            .time_series(true)
            .build(),
    ]
}

#[test]
fn test_default_config() {
    let config = AnnotatorConfig::default();
    assert!(config.validate);
    assert!(config.tag);
    assert!(config.deduplicate);
    assert_eq!(config.tie_break, TieBreak::LowestExperimentId);
    assert_eq!(config.balance_threshold, Some(0.3));
}

#[test]
fn test_builder_rejects_bad_threshold() {
    let err = Annotator::builder()
        .balance_threshold(Some(0.0))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn test_annotate_full_run() {
    let table = Annotator::builder().build().unwrap().annotate(two_projects()).unwrap();

    assert_eq!(table.len(), 5);
    let report = table.report();
    assert_eq!(report.record_count(), 5);
    assert_eq!(report.project_count(), 2);
    assert_eq!(report.control_count(), 2);
    assert_eq!(report.warning_count(), 1);
    assert_eq!(report.unmatched_count(), 1);

    let wild_type = table.find("SRX11").unwrap();
    assert_eq!(wild_type.sample(), Some("H3K4me3-WT"));
    assert_eq!(wild_type.perturbation(), Some(Perturbation::None));
    assert_eq!(wild_type.control(), Some("Input-WT"));
    assert!(!wild_type.warning());

    let flagged = table.find("SRX12").unwrap();
    assert!(flagged.warning());

    let deletion = table.find("SRX21").unwrap();
    assert_eq!(deletion.sample(), Some("Rap1-Sir3-gene_deletion"));
    assert_eq!(deletion.control(), Some(NO_CONTROL));
}

#[test]
fn test_projects_keep_first_appearance_order() {
    let table = Annotator::builder().build().unwrap().annotate(two_projects()).unwrap();
    let projects: Vec<_> = table.records().iter().map(ExperimentRecord::project_id).collect();
    assert_eq!(projects, vec!["PRJA", "PRJA", "PRJA", "PRJB", "PRJB"]);

    let ids: Vec<_> = table.records().iter().map(ExperimentRecord::experiment_id).collect();
    assert_eq!(ids, vec!["SRX11", "SRX12", "SRX10", "SRX21", "SRX20"]);
}

#[test]
fn test_parallel_matches_sequential() {
    let mut records = Vec::new();
    for p in 0..20 {
        let project = format!("PRJ{p}");
        records.push(
            ExperimentRecord::builder(format!("SRX{p}-0"), &project)
                .chip_input(true)
                .build(),
        );
        for e in 1..5 {
            records.push(
                ExperimentRecord::builder(format!("SRX{p}-{e}"), &project)
                    .chip_target("H3K4me3")
                    .build(),
            );
        }
    }

    let parallel = Annotator::builder().parallel(true).build().unwrap();
    let sequential = Annotator::builder().parallel(false).build().unwrap();
    let a = parallel.annotate(records.clone()).unwrap().into_records();
    let b = sequential.annotate(records).unwrap().into_records();
    assert_eq!(a, b);
}

#[test]
fn test_duplicates_dropped_keep_first() {
    let records = vec![
        ExperimentRecord::builder("SRX1", "PRJ").chip_target("first").build(),
        ExperimentRecord::builder("SRX1", "PRJ").chip_target("second").build(),
    ];
    let table = Annotator::builder().build().unwrap().annotate(records).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.report().duplicate_count(), 1);
    assert_eq!(table.find("SRX1").unwrap().chip_target(), "first");
}

#[test]
fn test_duplicates_rejected_without_dedupe() {
    let records = vec![
        ExperimentRecord::new("SRX1", "PRJ"),
        ExperimentRecord::new("SRX1", "PRJ"),
    ];
    let err = Annotator::builder()
        .deduplicate(false)
        .build()
        .unwrap()
        .annotate(records)
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateExperiment { .. }));
}

#[test]
fn test_missing_project_fails_fast() {
    let records = vec![ExperimentRecord::new("SRX1", "")];
    let err = Annotator::builder().build().unwrap().annotate(records).unwrap_err();
    assert!(matches!(err, Error::MissingField { field: "project_id", .. }));
}

#[test]
fn test_stages_can_be_disabled() {
    let annotator = Annotator::builder()
        .validate(false)
        .tag(false)
        .balance_threshold(None)
        .build()
        .unwrap();
    let table = annotator.annotate(two_projects()).unwrap();

    assert_eq!(table.report().warning_count(), 0);
    assert!(table.report().balance().is_empty());
    for record in table.records() {
        assert!(!record.warning());
        assert!(record.sample().is_none());
        assert!(record.control().is_none());
    }
}

#[test]
fn test_balance_reported_per_project() {
    let mut records = vec![ExperimentRecord::builder("SRX0", "PRJ")
        .chip_target("H3")
        .perturbed(PerturbationClass::GeneMutation, "H3-K4R")
        .build()];
    for i in 1..8 {
        records.push(
            ExperimentRecord::builder(format!("SRX{i}"), "PRJ")
                .chip_target("H3")
                .build(),
        );
    }

    let table = Annotator::builder().build().unwrap().annotate(records).unwrap();
    assert_eq!(table.report().balance().len(), 1);
    assert_eq!(table.report().imbalanced_projects(), vec!["PRJ"]);
}

#[test]
fn test_annotate_projects_from_json() {
    let json = r#"{
        "project_id": "PRJNA643248",
        "project_title": "Swi6 deletion",
        "model": "gpt-4o-mini",
        "experimentMeta": [
            {"experiment_id": "SRX1", "exp_title": "input", "gene_mutation": false,
             "gene_deletion": false, "protein_depletion": false, "stress_condition": false,
             "time_series": false, "chip_input": true, "antibody_control": false,
             "chip_target": null},
            {"experiment_id": "SRX2", "exp_title": "swi6 H3K9me2", "gene_mutation": false,
             "gene_deletion": true, "protein_depletion": false, "stress_condition": false,
             "time_series": false, "chip_input": false, "antibody_control": false,
             "chip_target": "H3K9me2", "deletion": "Swi6"}
        ]
    }"#;
    let project = ProjectAnnotation::from_json(json).unwrap();
    let table = Annotator::builder()
        .build()
        .unwrap()
        .annotate_projects(vec![project])
        .unwrap();

    let deletion = table.find("SRX2").unwrap();
    assert_eq!(deletion.project_id(), "PRJNA643248");
    assert_eq!(deletion.model(), Some("gpt-4o-mini"));
    assert_eq!(deletion.sample(), Some("H3K9me2-Swi6-gene_deletion"));
    assert_eq!(deletion.control(), Some(NO_CONTROL));
    assert_eq!(table.find("SRX1").unwrap().sample(), Some("Input-WT"));
}

#[test]
fn test_malformed_reply_is_an_error() {
    let json = r#"{"project_id": "P", "experiments": [{"experiment_id": "SRX1"}]}"#;
    let err = ProjectAnnotation::from_json(json).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn test_derived_fields_in_reply_are_ignored() {
    let json = r#"{
        "project_id": "PRJNA1",
        "experiments": [
            {"experiment_id": "SRX1", "gene_mutation": false, "gene_deletion": false,
             "protein_depletion": false, "stress_condition": false, "time_series": false,
             "chip_input": true, "antibody_control": false,
             "warning": true, "sample": "stale", "control": "SRX9", "control_id": "SRX9"},
            {"experiment_id": "SRX2", "gene_mutation": false, "gene_deletion": false,
             "protein_depletion": false, "stress_condition": false, "time_series": false,
             "chip_input": false, "antibody_control": false, "chip_target": "H3",
             "warning": true, "perturbation": "gene_deletion", "control": "SRX9"}
        ]
    }"#;
    let project = ProjectAnnotation::from_json(json).unwrap();

    let table = Annotator::builder()
        .validate(false)
        .build()
        .unwrap()
        .annotate_projects(vec![project.clone()])
        .unwrap();
    let input = table.find("SRX1").unwrap();
    assert_eq!(input.control(), None);
    assert_eq!(input.control_id(), None);
    assert!(!input.warning());
    assert_eq!(input.sample(), Some("Input-WT"));
    let treatment = table.find("SRX2").unwrap();
    assert!(!treatment.warning());
    assert_eq!(treatment.perturbation(), Some(Perturbation::None));
    assert_eq!(treatment.control(), Some("Input-WT"));
    assert_eq!(treatment.control_id(), Some("SRX1"));

    let untagged = Annotator::builder()
        .validate(false)
        .tag(false)
        .build()
        .unwrap()
        .annotate_projects(vec![project])
        .unwrap();
    for record in untagged.records() {
        assert!(!record.warning());
        assert!(record.sample().is_none());
        assert!(record.perturbation().is_none());
        assert!(record.control().is_none());
        assert!(record.control_id().is_none());
    }
}
