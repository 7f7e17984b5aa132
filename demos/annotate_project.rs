//! Annotate one project and print the curator summary.
//!
//! ```text
//! cargo run --example annotate_project -- [reply.json] [out.parquet]
//! ```
//!
//! Without arguments a small built-in project is used. Set `RUST_LOG=debug`
//! to see each control assignment.

use anyhow::Context;
use chip_annotate::pipeline::Annotator;
use chip_annotate::record::{ExperimentRecord, PerturbationClass, ProjectAnnotation};
use tracing_subscriber::EnvFilter;

fn builtin_project() -> ProjectAnnotation {
    let records = vec![
        ExperimentRecord::builder("SRX1", "PRJNA262623")
            .title("Input WT")
            .chip_input(true)
            .build(),
        ExperimentRecord::builder("SRX2", "PRJNA262623")
            .title("Input set2 deletion")
            .chip_input(true)
            .perturbed(PerturbationClass::GeneDeletion, "Set2")
            .build(),
        ExperimentRecord::builder("SRX3", "PRJNA262623")
            .title("H3K36me3 WT")
            .chip_target("H3K36me3")
            .build(),
        ExperimentRecord::builder("SRX4", "PRJNA262623")
            .title("H3K36me3 set2 deletion")
            .chip_target("H3K36me3")
            .perturbed(PerturbationClass::GeneDeletion, "set2")
            .build(),
        ExperimentRecord::builder("SRX5", "PRJNA262623")
            .title("H3K36me3 heat shock")
            .chip_target("H3K36me3")
            .perturbed(PerturbationClass::StressCondition, "heat shock")
            .time_course("15 min")
            .build(),
    ];

    ProjectAnnotation {
        project_id: "PRJNA262623".to_string(),
        project_title: "H3K36 methylation in budding yeast".to_string(),
        model: Some("builtin".to_string()),
        experiments: records,
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);

    let project = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading annotation reply {path}"))?;
            ProjectAnnotation::from_json(&json)
                .with_context(|| format!("parsing annotation reply {path}"))?
        }
        None => builtin_project(),
    };
    println!("Project {}: {}", project.project_id, project.project_title);

    let table = Annotator::builder().build()?.annotate_projects(vec![project])?;

    println!(
        "{:<12} {:<18} {:<40} {:<32} {:<7}",
        "experiment", "perturbation", "sample", "control", "warning"
    );
    for record in table.records() {
        println!(
            "{:<12} {:<18} {:<40} {:<32} {:<7}",
            record.experiment_id(),
            record.perturbation().map_or("-", |p| p.as_str()),
            record.sample().unwrap_or("-"),
            record.control().unwrap_or("(control)"),
            record.warning()
        );
    }

    println!();
    println!("{}", serde_json::to_string_pretty(table.report())?);

    if let Some(out) = args.next() {
        table
            .write_parquet(&out)
            .with_context(|| format!("writing {out}"))?;
        println!("Wrote {} rows to {out}", table.len());
    }

    Ok(())
}
