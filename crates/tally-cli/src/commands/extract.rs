//! Extract command - run an extractor over OCR text that is already on disk.

use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use glob::glob;

use tally_core::{
    BatchReport, BatchRunner, BatchStatus, DocumentExtractor, DocumentKind, GradeExtractor,
    MoneyExtractor, PlainTextSource,
};

use super::load_config;
use super::report::{format_document, format_totals, OutputFormat, RunOutput};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Text files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Kind of document the text comes from
    #[arg(short, long, value_enum, default_value = "invoice")]
    kind: KindArg,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum KindArg {
    /// Invoice text, searched for a total
    Invoice,
    /// Report card text, searched for final grades
    ReportCard,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    let extractor: Box<dyn DocumentExtractor> = match args.kind {
        KindArg::Invoice => Box::new(MoneyExtractor::from_config(&config.invoice)),
        KindArg::ReportCard => Box::new(GradeExtractor::from_config(&config.grades)),
    };
    let kind: DocumentKind = extractor.kind();

    let runner = BatchRunner::new(&PlainTextSource, extractor.as_ref());
    let documents = runner.process_each(&files, |report| {
        if args.format == OutputFormat::Text {
            print!(
                "{}",
                format_document(kind, report, config.invoice.max_listed)
            );
        }
    });

    let batches = [BatchReport {
        kind,
        dir: PathBuf::from(&args.input),
        status: BatchStatus::Completed,
        documents,
    }];

    match args.format {
        OutputFormat::Text => println!("{}", format_totals(&batches)),
        OutputFormat::Json => {
            let output = RunOutput {
                started_at: Utc::now(),
                batches: &batches,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
