//! Columnar output (Arrow/Parquet)
//!
//! The annotated table is handed to downstream collaborators as an Arrow
//! [`RecordBatch`]. Two views exist:
//!
//! - the full table: identity, every labelled field and every derived field
//! - the summary: [`SUMMARY_COLUMNS`], the columns a curator reviews
//!
//! Either view can be written to Parquet and loaded back as batches.

use crate::record::{ExperimentRecord, PerturbationClass};
use crate::{Error, Result};
use arrow::array::{ArrayRef, BooleanArray, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::path::Path;
use std::sync::Arc;

/// Columns of the summary view, in output order.
pub const SUMMARY_COLUMNS: [&str; 7] = [
    "project_id",
    "experiment_id",
    "title",
    "perturbation",
    "sample",
    "control",
    "warning",
];

/// Schema of the full annotated table.
#[must_use]
pub fn annotated_schema() -> SchemaRef {
    let utf8 = |name: &str, nullable: bool| Field::new(name, DataType::Utf8, nullable);
    let flag = |name: &str| Field::new(name, DataType::Boolean, false);

    Arc::new(Schema::new(vec![
        utf8("project_id", false),
        utf8("experiment_id", false),
        utf8("title", false),
        utf8("model", true),
        flag("gene_mutation"),
        flag("gene_deletion"),
        flag("protein_depletion"),
        flag("stress_condition"),
        flag("time_series"),
        flag("chip_input"),
        flag("antibody_control"),
        utf8("chip_target", false),
        utf8("mutation", true),
        utf8("deletion", true),
        utf8("depletion", true),
        utf8("stress", true),
        utf8("time_point", true),
        utf8("perturbation", true),
        utf8("sample", true),
        utf8("control", true),
        utf8("control_id", true),
        flag("warning"),
    ]))
}

fn text<'a>(
    records: &'a [ExperimentRecord],
    value: impl Fn(&'a ExperimentRecord) -> &'a str,
) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(records.iter().map(value)))
}

fn optional_text<'a>(
    records: &'a [ExperimentRecord],
    value: impl Fn(&'a ExperimentRecord) -> Option<&'a str>,
) -> ArrayRef {
    Arc::new(records.iter().map(value).collect::<StringArray>())
}

fn flag(records: &[ExperimentRecord], value: impl Fn(&ExperimentRecord) -> bool) -> ArrayRef {
    Arc::new(BooleanArray::from(
        records.iter().map(value).collect::<Vec<bool>>(),
    ))
}

/// Convert annotated records into one record batch with [`annotated_schema`].
///
/// Blank descriptors are written as nulls.
///
/// # Errors
///
/// Returns [`Error::Arrow`] if the batch cannot be assembled
pub fn to_record_batch(records: &[ExperimentRecord]) -> Result<RecordBatch> {
    let columns = vec![
        text(records, ExperimentRecord::project_id),
        text(records, ExperimentRecord::experiment_id),
        text(records, ExperimentRecord::title),
        optional_text(records, ExperimentRecord::model),
        flag(records, |r| r.flag(PerturbationClass::GeneMutation)),
        flag(records, |r| r.flag(PerturbationClass::GeneDeletion)),
        flag(records, |r| r.flag(PerturbationClass::ProteinDepletion)),
        flag(records, |r| r.flag(PerturbationClass::StressCondition)),
        flag(records, ExperimentRecord::time_series),
        flag(records, ExperimentRecord::chip_input),
        flag(records, ExperimentRecord::antibody_control),
        text(records, ExperimentRecord::chip_target),
        optional_text(records, |r| r.descriptor(PerturbationClass::GeneMutation)),
        optional_text(records, |r| r.descriptor(PerturbationClass::GeneDeletion)),
        optional_text(records, |r| r.descriptor(PerturbationClass::ProteinDepletion)),
        optional_text(records, |r| r.descriptor(PerturbationClass::StressCondition)),
        optional_text(records, ExperimentRecord::time_point),
        optional_text(records, |r| r.perturbation().map(|p| p.as_str())),
        optional_text(records, ExperimentRecord::sample),
        optional_text(records, ExperimentRecord::control),
        optional_text(records, ExperimentRecord::control_id),
        flag(records, ExperimentRecord::warning),
    ];

    Ok(RecordBatch::try_new(annotated_schema(), columns)?)
}

/// Convert annotated records into the summary view.
///
/// # Errors
///
/// Returns [`Error::Arrow`] if the batch cannot be assembled
pub fn summary_batch(records: &[ExperimentRecord]) -> Result<RecordBatch> {
    let full = to_record_batch(records)?;
    let schema = full.schema();
    let indices = SUMMARY_COLUMNS
        .iter()
        .map(|name| schema.index_of(name))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(full.project(&indices)?)
}

/// Write one batch to a Parquet file, replacing any existing file.
///
/// # Errors
///
/// Returns error if the file cannot be created or written
pub fn write_parquet<P: AsRef<Path>>(path: P, batch: &RecordBatch) -> Result<()> {
    use parquet::arrow::ArrowWriter;
    use std::fs::File;

    let file = File::create(path.as_ref())?;

    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).map_err(|e| {
        Error::StorageError(format!("Failed to create Parquet writer: {e}"))
    })?;

    writer.write(batch).map_err(|e| {
        Error::StorageError(format!("Failed to write record batch: {e}"))
    })?;

    writer.close().map_err(|e| {
        Error::StorageError(format!("Failed to finalize Parquet file: {e}"))
    })?;

    Ok(())
}

/// Load every record batch from a Parquet file.
///
/// # Errors
///
/// Returns error if file cannot be read or parsed
pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<Vec<RecordBatch>> {
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use std::fs::File;

    let file = File::open(path.as_ref()).map_err(|e| {
        Error::StorageError(format!("Failed to open Parquet file: {e}"))
    })?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| {
        Error::StorageError(format!("Failed to parse Parquet file: {e}"))
    })?;

    let reader = builder.build().map_err(|e| {
        Error::StorageError(format!("Failed to create Parquet reader: {e}"))
    })?;

    let mut batches = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| {
            Error::StorageError(format!("Failed to read record batch: {e}"))
        })?;
        batches.push(batch);
    }

    Ok(batches)
}
