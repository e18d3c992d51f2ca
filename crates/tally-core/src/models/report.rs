//! Per-document and per-batch results.

use std::fmt;
use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of scanned document a pipeline handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Invoice, searched for a monetary total.
    Invoice,
    /// Report card, searched for final grades.
    ReportCard,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Invoice => write!(f, "invoice"),
            DocumentKind::ReportCard => write!(f, "report card"),
        }
    }
}

/// What the monetary extractor found in one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvoiceFindings {
    /// A total keyword was present; `total` was chosen among `candidates`.
    Total {
        total: Decimal,
        candidates: Vec<Decimal>,
    },
    /// Amounts were found but nothing labels a total.
    Candidates { candidates: Vec<Decimal> },
    /// No money-shaped amounts at all.
    NoAmounts,
}

/// What the grade extractor found in one report card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GradeFindings {
    /// Final grades in line order with their arithmetic mean.
    Grades { grades: Vec<Decimal>, mean: Decimal },
    /// No final grades detected.
    NoGrades,
}

/// Findings for either document kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Findings {
    Invoice(InvoiceFindings),
    Grades(GradeFindings),
}

/// Outcome of processing one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DocumentOutcome {
    /// Text was obtained and extraction ran.
    Extracted { findings: Findings },
    /// Text could not be obtained or processed.
    Failed { error: String },
}

impl DocumentOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, DocumentOutcome::Failed { .. })
    }
}

/// Report for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Source file.
    pub path: PathBuf,

    /// File name used to identify the document in reports.
    pub name: String,

    /// Extraction result or failure.
    pub outcome: DocumentOutcome,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// How a batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Every eligible document was attempted.
    Completed,
    /// The input directory does not exist.
    MissingInput,
    /// The input directory holds no eligible images.
    NoContent,
    /// The input path could not be listed.
    Unreadable,
}

/// Report for one pipeline run over a directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Document kind handled by the pipeline.
    pub kind: DocumentKind,

    /// Input directory.
    pub dir: PathBuf,

    /// Whether the batch ran or was skipped.
    pub status: BatchStatus,

    /// Per-document reports, in processing order.
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    /// Number of documents that failed.
    pub fn failed_count(&self) -> usize {
        self.documents.iter().filter(|d| d.outcome.is_failed()).count()
    }

    /// Number of documents that produced findings.
    pub fn succeeded_count(&self) -> usize {
        self.documents.len() - self.failed_count()
    }
}
