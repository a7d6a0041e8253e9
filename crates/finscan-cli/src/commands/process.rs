//! Process command - extract fields from a single document image.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use finscan_core::{
    create_recognizer, DocumentCategory, FinscanConfig, Pipeline, StaticRecognizer, TextRecognizer,
};

use super::load_config;
use super::output::{describe_failure, format_report, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input image (PNG or JPEG)
    #[arg(required = true)]
    input: PathBuf,

    /// Document category (invoice, payslip, profit_loss)
    #[arg(short = 't', long = "category")]
    category: DocumentCategory,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Use text from this file instead of running the recognizer
    #[arg(long)]
    replay_text: Option<PathBuf>,

    /// Append the recognized text to text and CSV output
    #[arg(long)]
    show_text: bool,
}

/// Recognizer for a run: replayed text if requested, else the configured engine.
pub fn build_recognizer(
    replay_text: Option<&PathBuf>,
    config: &FinscanConfig,
) -> anyhow::Result<Arc<dyn TextRecognizer>> {
    match replay_text {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| {
                anyhow::anyhow!("Failed to read replay text {}: {}", path.display(), e)
            })?;
            debug!("Replaying {} bytes of recognized text", text.len());
            Ok(Arc::new(StaticRecognizer::new(text)))
        }
        None => Ok(create_recognizer(&config.ocr)?),
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing {} as {}", args.input.display(), args.category);

    let recognizer = build_recognizer(args.replay_text.as_ref(), &config)?;
    let pipeline = Pipeline::new(recognizer, &config);
    let bytes = fs::read(&args.input)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Extracting {} fields...", args.category.title().to_lowercase()));

    let result = pipeline.run(&bytes, args.category);
    pb.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(failure) => {
            eprintln!("{} {}", style("✗").red(), describe_failure(&failure));
            if args.show_text {
                if let Some(text) = &failure.recognized_text {
                    eprintln!("\n--- recognized text ---\n{}", text);
                }
            }
            return Err(failure.into());
        }
    };

    for warning in &report.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let output = format_report(&report, args.format, args.show_text)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
