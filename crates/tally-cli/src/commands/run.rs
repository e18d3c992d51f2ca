//! Run command - OCR every invoice and report card image and report findings.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use tally_core::{BatchEvent, OcrTextSource, Pipelines};

use super::load_config;
use super::report::{
    format_batch_skipped, format_batch_start, format_document, format_totals, write_summary,
    OutputFormat, RunOutput,
};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Directory of invoice images (overrides configuration)
    #[arg(long)]
    invoices: Option<PathBuf>,

    /// Directory of report card images (overrides configuration)
    #[arg(long)]
    report_cards: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also write a CSV summary to this file
    #[arg(long)]
    summary: Option<PathBuf>,
}

pub async fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let started_at = Utc::now();

    let mut config = load_config(config_path)?;
    if let Some(dir) = args.invoices {
        config.input.invoice_dir = dir;
    }
    if let Some(dir) = args.report_cards {
        config.input.report_card_dir = dir;
    }

    let source = OcrTextSource::from_config(&config);
    let pipelines = Pipelines::from_config(&config);
    let max_listed = config.invoice.max_listed;
    let text_output = args.format == OutputFormat::Text;

    let mut progress: Option<ProgressBar> = None;
    let batches = pipelines.run_all(&source, &config, |event| match event {
        BatchEvent::Started {
            kind,
            dir,
            documents,
        } => {
            if text_output {
                println!("{}", format_batch_start(kind, dir, documents));
            }
            progress = Some(new_progress_bar(documents as u64));
        }
        BatchEvent::Skipped { kind, reason } => {
            if text_output {
                println!("{}", format_batch_skipped(kind, reason));
            }
        }
        BatchEvent::Document { kind, report } => {
            let block = format_document(kind, report, max_listed);
            match &progress {
                Some(pb) => {
                    if text_output {
                        pb.suspend(|| print!("{}", block));
                    }
                    pb.inc(1);
                    if pb.position() >= pb.length().unwrap_or(0) {
                        pb.finish_and_clear();
                    }
                }
                None if text_output => print!("{}", block),
                None => {}
            }
        }
    });

    match args.format {
        OutputFormat::Text => println!("{}", format_totals(&batches)),
        OutputFormat::Json => {
            let output = RunOutput {
                started_at,
                batches: &batches,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &batches)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn new_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(progress_style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents")
    {
        pb.set_style(progress_style.progress_chars("=>-"));
    }
    pb
}
