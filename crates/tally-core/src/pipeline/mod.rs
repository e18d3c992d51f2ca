//! Batch drivers: enumerate documents, obtain their text, extract findings.
//!
//! Every document is processed to completion before the next one starts and
//! its failure is captured in its own report, so one unreadable scan never
//! stops the batch.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use crate::error::{DocumentError, PipelineError};
use crate::extract::{DocumentExtractor, GradeExtractor, MoneyExtractor};
use crate::models::config::{InputConfig, TallyConfig};
use crate::models::report::{
    BatchReport, BatchStatus, DocumentKind, DocumentOutcome, DocumentReport,
};
use crate::ocr::TextSource;

/// List eligible files directly inside `dir`, sorted by path.
pub fn discover_images(dir: &Path, input: &InputConfig) -> Result<Vec<PathBuf>, PipelineError> {
    let entries = fs::read_dir(dir).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PipelineError::MissingInput {
            path: dir.to_path_buf(),
        },
        _ => PipelineError::Unreadable {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| input.accepts_extension(ext))
        })
        .collect();

    if files.is_empty() {
        return Err(PipelineError::NoContent {
            path: dir.to_path_buf(),
        });
    }

    files.sort();
    Ok(files)
}

/// Runs one extractor over every document of a directory.
pub struct BatchRunner<'a> {
    source: &'a dyn TextSource,
    extractor: &'a dyn DocumentExtractor,
    input: InputConfig,
}

impl<'a> BatchRunner<'a> {
    pub fn new(source: &'a dyn TextSource, extractor: &'a dyn DocumentExtractor) -> Self {
        Self {
            source,
            extractor,
            input: InputConfig::default(),
        }
    }

    /// Set which file extensions are eligible.
    pub fn with_input(mut self, input: InputConfig) -> Self {
        self.input = input;
        self
    }

    pub fn kind(&self) -> DocumentKind {
        self.extractor.kind()
    }

    /// Process a single document, converting any failure into its report.
    pub fn process_document(&self, path: &Path) -> DocumentReport {
        let start = Instant::now();

        let outcome = match self.source.text_for(path) {
            Ok(text) => DocumentOutcome::Extracted {
                findings: self.extractor.extract(&text),
            },
            Err(e) => {
                let error = DocumentError::new(path, e);
                warn!("{}", error);
                DocumentOutcome::Failed {
                    error: error.source.to_string(),
                }
            }
        };

        DocumentReport {
            path: path.to_path_buf(),
            name: display_name(path),
            outcome,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Process the given documents in order, handing each finished report to `on_report`.
    pub fn process_each<F>(&self, files: &[PathBuf], mut on_report: F) -> Vec<DocumentReport>
    where
        F: FnMut(&DocumentReport),
    {
        files
            .iter()
            .map(|path| {
                let report = self.process_document(path);
                on_report(&report);
                report
            })
            .collect()
    }

    /// Discover documents in `dir` and process them all.
    ///
    /// A missing or empty directory yields a skipped batch, not an error.
    pub fn run(&self, dir: &Path) -> BatchReport {
        self.run_with(dir, |_| {})
    }

    /// Like [`run`](Self::run), announcing progress through `on_event`.
    pub fn run_with<F>(&self, dir: &Path, mut on_event: F) -> BatchReport
    where
        F: FnMut(BatchEvent<'_>),
    {
        let kind = self.kind();
        let (status, documents) = match discover_images(dir, &self.input) {
            Ok(files) => {
                info!("Found {} {} images in {}", files.len(), kind, dir.display());
                on_event(BatchEvent::Started {
                    kind,
                    dir,
                    documents: files.len(),
                });
                let documents = self.process_each(&files, |report| {
                    on_event(BatchEvent::Document { kind, report })
                });
                (BatchStatus::Completed, documents)
            }
            Err(e) => {
                warn!("Skipping {} batch: {}", kind, e);
                on_event(BatchEvent::Skipped { kind, reason: &e });
                let status = match e {
                    PipelineError::MissingInput { .. } => BatchStatus::MissingInput,
                    PipelineError::NoContent { .. } => BatchStatus::NoContent,
                    PipelineError::Unreadable { .. } => BatchStatus::Unreadable,
                };
                (status, Vec::new())
            }
        };

        BatchReport {
            kind,
            dir: dir.to_path_buf(),
            status,
            documents,
        }
    }
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug, Clone, Copy)]
pub enum BatchEvent<'a> {
    /// Documents were discovered and processing begins.
    Started {
        kind: DocumentKind,
        dir: &'a Path,
        documents: usize,
    },
    /// The batch was skipped.
    Skipped {
        kind: DocumentKind,
        reason: &'a PipelineError,
    },
    /// One document finished, successfully or not.
    Document {
        kind: DocumentKind,
        report: &'a DocumentReport,
    },
}

/// Extractors for both document kinds, built from one configuration.
pub struct Pipelines {
    pub invoices: MoneyExtractor,
    pub grades: GradeExtractor,
}

impl Pipelines {
    pub fn from_config(config: &TallyConfig) -> Self {
        Self {
            invoices: MoneyExtractor::from_config(&config.invoice),
            grades: GradeExtractor::from_config(&config.grades),
        }
    }

    /// Run the invoice batch, then the report card batch.
    pub fn run_all<F>(
        &self,
        source: &dyn TextSource,
        config: &TallyConfig,
        mut on_event: F,
    ) -> Vec<BatchReport>
    where
        F: FnMut(BatchEvent<'_>),
    {
        let batches: [(&dyn DocumentExtractor, &Path); 2] = [
            (&self.invoices, config.input.invoice_dir.as_path()),
            (&self.grades, config.input.report_card_dir.as_path()),
        ];

        batches
            .into_iter()
            .map(|(extractor, dir)| {
                BatchRunner::new(source, extractor)
                    .with_input(config.input.clone())
                    .run_with(dir, &mut on_event)
            })
            .collect()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
