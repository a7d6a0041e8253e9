//! Batch processing command for multiple document images.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use finscan_core::{DocumentCategory, ExtractionReport, Pipeline};

use super::load_config;
use super::output::{describe_failure, format_report, OutputFormat};
use super::process::build_recognizer;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input images
    #[arg(required = true)]
    input: String,

    /// Document category shared by all inputs
    #[arg(short = 't', long = "category")]
    category: DocumentCategory,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Use text from this file for every input instead of running the recognizer
    #[arg(long)]
    replay_text: Option<PathBuf>,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    report: Option<ExtractionReport>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "png" | "jpg" | "jpeg")
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let recognizer = build_recognizer(args.replay_text.as_ref(), &config)?;
    let pipeline = Arc::new(Pipeline::new(recognizer, &config));
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // Set by the first failing task unless --continue-on-error; stops new spawns
    let stop = Arc::new(AtomicBool::new(false));
    let stop_on_error = !args.continue_on_error;

    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        if stop.load(Ordering::SeqCst) {
            debug!("Not starting {} after an earlier failure", path.display());
            break;
        }
        let pipeline = Arc::clone(&pipeline);
        let stop = Arc::clone(&stop);
        let category = args.category;

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let file_start = Instant::now();
            let outcome = fs::read(&path)
                .map_err(|e| format!("failed to read file: {}", e))
                .and_then(|bytes| {
                    pipeline
                        .run(&bytes, category)
                        .map_err(|failure| describe_failure(&failure))
                });
            let processing_time_ms = file_start.elapsed().as_millis() as u64;

            match outcome {
                Ok(report) => ProcessResult {
                    path,
                    report: Some(report),
                    error: None,
                    processing_time_ms,
                },
                Err(error) => {
                    if stop_on_error {
                        stop.store(true, Ordering::SeqCst);
                    }
                    ProcessResult {
                        path,
                        report: None,
                        error: Some(error),
                        processing_time_ms,
                    }
                }
            }
        }));
    }

    // Handles are awaited in input order, so results keep the glob order
    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = handle.await?;
        overall_pb.inc(1);

        if let Some(error_msg) = &result.error {
            if stop_on_error {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            }
        }
        results.push(result);
    }

    let first_failure = results.iter().find(|r| r.error.is_some());
    if stop_on_error && first_failure.is_some() {
        overall_pb.abandon();
    } else {
        overall_pb.finish_with_message("Complete");
    }

    let successful: Vec<_> = results.iter().filter(|r| r.report.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            if let Some(report) = &result.report {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("document");
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, format_report(report, args.format, false)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in &failed {
            eprintln!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    if stop_on_error {
        if let Some(result) = first_failure {
            anyhow::bail!(
                "Processing failed for {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "matched_fields",
        "total_fields",
        "line_items",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        if let Some(report) = &result.report {
            wtr.write_record([
                filename,
                "success",
                &report.matched_fields().to_string(),
                &report.fields.len().to_string(),
                &report.line_items.len().to_string(),
                &report.warnings.len().to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
