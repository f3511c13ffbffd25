//! Moodset - Labeled Audio Feature Dataset Builder

use anyhow::{bail, Context};
use clap::Parser;
use std::path::Path;
use std::process;
use std::time::Instant;
use moodset::config::Config;
use moodset::dataset::{FileOutcome, LabelGroup};
use moodset::{init_logging, Args, BatchReport, Dataset, DatasetBuilder, DatasetWriter};

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    if args.verbose {
        println!("{}", moodset::get_library_info());
        println!();
    }

    if let Some(path) = &args.write_default_config {
        Config::create_default_config(path)
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;
        println!("Default config written to {}", path.display());
        return Ok(());
    }

    let dry_run = args.dry_run;
    let config = Config::from_args_and_config(args).context("Invalid configuration")?;
    if config.batch.groups.is_empty() {
        bail!("No input groups; pass -g DIR=LABEL or list [[batch.groups]] in the config file");
    }

    let groups: Vec<LabelGroup> = config.batch.groups.iter().cloned().map(LabelGroup::from).collect();
    let builder = DatasetBuilder::from_config(&config);

    println!("=== Moodset Dataset Builder ===");
    for group in &groups {
        println!("Group: {} -> {}", group.path.display(), group.label);
    }
    println!("Output: {}", config.output_path().display());
    println!("Sample rate: {} Hz", config.sample_rate());
    if config.jobs() == 0 {
        println!("Mode: Sequential");
    } else {
        println!("Mode: Parallel ({} workers)", config.jobs());
    }
    println!("===============================\n");

    if dry_run {
        return list_groups(&builder, &groups);
    }

    let start = Instant::now();
    let mut dataset = Dataset::new();
    let mut report = BatchReport::default();

    for group in &groups {
        let (part, part_report) = builder
            .build_group(&group.path, &group.label)
            .with_context(|| format!("Failed to process group {}", group.path.display()))?;
        print_outcomes(&part_report);
        dataset.append(part)?;
        report.merge(part_report);
    }

    let output = config.output_path();
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    DatasetWriter::write(&dataset, output)?;

    println!("\n=== Processing Complete ===");
    println!("Rows written: {} / {} files scanned", report.rows, report.files_scanned);
    println!("Skipped: {}", report.skipped_count());
    if config.verbose() {
        println!("Ignored entries: {}", report.ignored);
        for (label, count) in dataset.label_counts() {
            println!("  {}: {} rows", label, count);
        }
    }
    println!("Time: {:.2}s", start.elapsed().as_secs_f64());
    println!("Saved: {}", output.display());

    Ok(())
}

fn list_groups(builder: &DatasetBuilder, groups: &[LabelGroup]) -> anyhow::Result<()> {
    let mut total = 0;
    for group in groups {
        let scan = builder
            .scan(&group.path)
            .with_context(|| format!("Failed to scan group {}", group.path.display()))?;
        println!("[{}] {} ({} files, {} ignored)", group.label, group.path.display(), scan.files.len(), scan.ignored);
        for file in &scan.files {
            println!("  {}", file_name(file));
        }
        total += scan.files.len();
    }
    println!("\nDry run: {} files would be processed", total);
    Ok(())
}

fn print_outcomes(report: &BatchReport) {
    for outcome in &report.outcomes {
        println!("processing: {}", file_name(outcome.path()));
        if let FileOutcome::Skipped(skipped) = outcome {
            println!("  skipped ({}): {}", skipped.error.kind(), skipped.error);
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
