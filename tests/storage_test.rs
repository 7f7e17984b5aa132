//! Parquet export tests

use arrow::array::{Array, BooleanArray, StringArray};
use chip_annotate::pipeline::Annotator;
use chip_annotate::record::{ExperimentRecord, PerturbationClass};
use chip_annotate::storage::{annotated_schema, load_parquet, write_parquet, SUMMARY_COLUMNS};
use chip_annotate::{AnnotatedTable, Error};
use tempfile::tempdir;

fn annotated() -> AnnotatedTable {
    let records = vec![
        ExperimentRecord::builder("SRX1", "PRJNA262623")
            .title("input")
            .chip_input(true)
            .model("gpt-4o-mini")
            .build(),
        ExperimentRecord::builder("SRX2", "PRJNA262623")
            .title("H3K36me3 in set2 deletion")
            .chip_target("H3K36me3")
            .perturbed(PerturbationClass::GeneDeletion, "Set2")
            .model("gpt-4o-mini")
            .build(),
        ExperimentRecord::builder("SRX3", "PRJNA262623")
            .title("H3K36me3 wild type")
            .chip_target("H3K36me3")
            .model("gpt-4o-mini")
            .build(),
    ];
    Annotator::builder().build().unwrap().annotate(records).unwrap()
}

fn strings(batch: &arrow::record_batch::RecordBatch, name: &str) -> Vec<Option<String>> {
    let idx = batch.schema().index_of(name).unwrap();
    let column = batch
        .column(idx)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    (0..column.len())
        .map(|i| (!column.is_null(i)).then(|| column.value(i).to_string()))
        .collect()
}

#[test]
fn test_write_and_load_full_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("annotated.parquet");

    let table = annotated();
    table.write_parquet(&path).unwrap();

    let batches = load_parquet(&path).unwrap();
    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    assert_eq!(rows, 3);
    assert_eq!(batches[0].schema().fields(), annotated_schema().fields());
}

#[test]
fn test_loaded_values_survive() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("annotated.parquet");
    annotated().write_parquet(&path).unwrap();

    let batch = &load_parquet(&path).unwrap()[0];
    assert_eq!(
        strings(batch, "experiment_id"),
        vec![Some("SRX2".into()), Some("SRX3".into()), Some("SRX1".into())]
    );
    assert_eq!(
        strings(batch, "control"),
        vec![Some("none".into()), Some("Input-WT".into()), None]
    );
    assert_eq!(
        strings(batch, "control_id"),
        vec![None, Some("SRX1".into()), None]
    );
    assert_eq!(
        strings(batch, "perturbation"),
        vec![
            Some("gene_deletion".into()),
            Some("none".into()),
            Some("none".into())
        ]
    );

    let idx = batch.schema().index_of("warning").unwrap();
    let warning = batch
        .column(idx)
        .as_any()
        .downcast_ref::<BooleanArray>()
        .unwrap();
    assert_eq!(warning.true_count(), 0);
}

#[test]
fn test_summary_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("summary.parquet");

    let summary = annotated().summary_batch().unwrap();
    write_parquet(&path, &summary).unwrap();

    let batch = &load_parquet(&path).unwrap()[0];
    let names: Vec<_> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    assert_eq!(names, SUMMARY_COLUMNS.to_vec());
    assert_eq!(
        strings(batch, "sample"),
        vec![
            Some("H3K36me3-Set2-gene_deletion".into()),
            Some("H3K36me3-WT".into()),
            Some("Input-WT".into())
        ]
    );
}

#[test]
fn test_load_missing_file() {
    let dir = tempdir().unwrap();
    let err = load_parquet(dir.path().join("absent.parquet")).unwrap_err();
    assert!(matches!(err, Error::StorageError(_)));
}

#[test]
fn test_write_into_missing_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no").join("such").join("dir.parquet");
    let err = annotated().write_parquet(&path).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
