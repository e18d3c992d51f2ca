//! Rendering of per-document and per-batch results.

use std::path::Path;

use chrono::{DateTime, Utc};
use console::style;
use rust_decimal::Decimal;
use serde::Serialize;

use tally_core::{
    format_amount, BatchReport, DocumentKind, DocumentOutcome, DocumentReport, Findings,
    GradeFindings, InvoiceFindings, PipelineError,
};

const RULE_WIDTH: usize = 72;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable console report
    Text,
    /// JSON document with every batch
    Json,
}

/// Everything a run produced, as written in JSON mode.
#[derive(Debug, Serialize)]
pub struct RunOutput<'a> {
    pub started_at: DateTime<Utc>,
    pub batches: &'a [BatchReport],
}

/// Line announcing a batch.
pub fn format_batch_start(kind: DocumentKind, dir: &Path, documents: usize) -> String {
    format!(
        "\n{} Scanning {} {} images in {}",
        style("🔎").cyan(),
        documents,
        kind,
        dir.display()
    )
}

/// Line explaining why a batch was skipped.
pub fn format_batch_skipped(kind: DocumentKind, reason: &PipelineError) -> String {
    let message = match reason {
        PipelineError::MissingInput { path } => {
            format!("The {} directory does not exist: {}", kind, path.display())
        }
        PipelineError::NoContent { path } => {
            format!("No {} images found in {}", kind, path.display())
        }
        PipelineError::Unreadable { path, reason } => {
            format!("Cannot read the {} directory {}: {}", kind, path.display(), reason)
        }
    };
    format!("\n{} {}", style("🚫").red(), message)
}

/// Complete text block for one document, printed in one piece.
pub fn format_document(kind: DocumentKind, report: &DocumentReport, max_listed: usize) -> String {
    let mut output = String::new();

    let title = match kind {
        DocumentKind::Invoice => "Invoice",
        DocumentKind::ReportCard => "Report card",
    };
    output.push_str(&format!("\n{}: {}\n", style(title).bold(), report.name));
    output.push_str(&"-".repeat(RULE_WIDTH));
    output.push('\n');

    match &report.outcome {
        DocumentOutcome::Failed { error } => {
            output.push_str(&format!(
                "{} Failed to process {}: {}\n",
                style("✗").red(),
                report.path.display(),
                error
            ));
        }
        DocumentOutcome::Extracted { findings } => match findings {
            Findings::Invoice(findings) => push_invoice(&mut output, findings, max_listed),
            Findings::Grades(findings) => push_grades(&mut output, findings),
        },
    }

    output
}

fn push_invoice(output: &mut String, findings: &InvoiceFindings, max_listed: usize) {
    match findings {
        InvoiceFindings::Total { total, candidates } => {
            output.push_str(&format!(
                "{} Found a TOTAL reference alongside amounts.\n",
                style("✓").green()
            ));
            output.push_str(&format!(
                "Amounts (normalized): {}\n",
                list_amounts(candidates, max_listed)
            ));
            output.push_str(&format!(
                "Total candidate: {}\n",
                style(format_amount(*total)).bold()
            ));
        }
        InvoiceFindings::Candidates { candidates } => {
            output.push_str(&format!(
                "{} Amounts found, but no TOTAL keyword appears.\n",
                style("ℹ").blue()
            ));
            output.push_str(&format!(
                "Amounts (normalized): {}\n",
                list_amounts(candidates, max_listed)
            ));
        }
        InvoiceFindings::NoAmounts => {
            output.push_str(&format!(
                "{} No amounts or total references found.\n",
                style("⚠").yellow()
            ));
        }
    }
}

fn push_grades(output: &mut String, findings: &GradeFindings) {
    match findings {
        GradeFindings::Grades { grades, mean } => {
            output.push_str(&format!(
                "Final grades detected ({}): {}\n",
                grades.len(),
                list_amounts(grades, usize::MAX)
            ));
            output.push_str(&format!(
                "Average final grade: {}\n",
                style(format_amount(*mean)).bold()
            ));
        }
        GradeFindings::NoGrades => {
            output.push_str(&format!(
                "{} No final grades detected. Check the image quality or the 'NOTA FINAL' header.\n",
                style("⚠").yellow()
            ));
        }
    }
}

/// Comma-separated values, truncated with an ellipsis past `limit`.
pub fn list_amounts(values: &[Decimal], limit: usize) -> String {
    let listed: Vec<String> = values.iter().take(limit).map(|v| format_amount(*v)).collect();
    let mut joined = listed.join(", ");
    if values.len() > limit {
        joined.push_str(" ...");
    }
    joined
}

/// Final tally across batches.
pub fn format_totals(batches: &[BatchReport]) -> String {
    let processed: usize = batches.iter().map(|b| b.documents.len()).sum();
    let failed: usize = batches.iter().map(|b| b.failed_count()).sum();

    format!(
        "\n{} Processed {} documents\n   {} successful, {} failed",
        style("✓").green(),
        processed,
        style(processed - failed).green(),
        style(failed).red()
    )
}

/// Write a CSV summary with one row per document.
pub fn write_summary(path: &Path, batches: &[BatchReport]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "kind",
        "filename",
        "status",
        "total",
        "amounts",
        "grades",
        "mean",
        "processing_time_ms",
        "error",
    ])?;

    for batch in batches {
        let kind = match batch.kind {
            DocumentKind::Invoice => "invoice",
            DocumentKind::ReportCard => "report_card",
        };

        for document in &batch.documents {
            let mut row = SummaryRow::default();

            match &document.outcome {
                DocumentOutcome::Failed { error } => {
                    row.status = "error";
                    row.error = error.clone();
                }
                DocumentOutcome::Extracted { findings } => match findings {
                    Findings::Invoice(InvoiceFindings::Total { total, candidates }) => {
                        row.status = "total";
                        row.total = total.to_string();
                        row.amounts = join_plain(candidates);
                    }
                    Findings::Invoice(InvoiceFindings::Candidates { candidates }) => {
                        row.status = "amounts";
                        row.amounts = join_plain(candidates);
                    }
                    Findings::Invoice(InvoiceFindings::NoAmounts) => {
                        row.status = "no_amounts";
                    }
                    Findings::Grades(GradeFindings::Grades { grades, mean }) => {
                        row.status = "grades";
                        row.grades = join_plain(grades);
                        row.mean = mean.round_dp(2).to_string();
                    }
                    Findings::Grades(GradeFindings::NoGrades) => {
                        row.status = "no_grades";
                    }
                },
            }

            let time_ms = document.processing_time_ms.to_string();
            wtr.write_record([
                kind,
                document.name.as_str(),
                row.status,
                row.total.as_str(),
                row.amounts.as_str(),
                row.grades.as_str(),
                row.mean.as_str(),
                time_ms.as_str(),
                row.error.as_str(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[derive(Default)]
struct SummaryRow {
    status: &'static str,
    total: String,
    amounts: String,
    grades: String,
    mean: String,
    error: String,
}

fn join_plain(values: &[Decimal]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn report(outcome: DocumentOutcome) -> DocumentReport {
        DocumentReport {
            path: PathBuf::from("scans/doc.png"),
            name: "doc.png".to_string(),
            outcome,
            processing_time_ms: 3,
        }
    }

    #[test]
    fn test_list_amounts_truncates() {
        let values: Vec<Decimal> = (1..=4).map(Decimal::from).collect();
        assert_eq!(list_amounts(&values, 2), "1.00, 2.00 ...");
        assert_eq!(list_amounts(&values, 15), "1.00, 2.00, 3.00, 4.00");
    }

    #[test]
    fn test_invoice_block() {
        console::set_colors_enabled(false);
        let block = format_document(
            DocumentKind::Invoice,
            &report(DocumentOutcome::Extracted {
                findings: Findings::Invoice(InvoiceFindings::Total {
                    total: dec("1200.00"),
                    candidates: vec![dec("50.00"), dec("1200.00")],
                }),
            }),
            15,
        );

        assert!(block.contains("Invoice: doc.png"));
        assert!(block.contains("Amounts (normalized): 50.00, 1,200.00"));
        assert!(block.contains("Total candidate: 1,200.00"));
    }

    #[test]
    fn test_grade_block() {
        console::set_colors_enabled(false);
        let block = format_document(
            DocumentKind::ReportCard,
            &report(DocumentOutcome::Extracted {
                findings: Findings::Grades(GradeFindings::Grades {
                    grades: vec![dec("85"), dec("91")],
                    mean: dec("88"),
                }),
            }),
            15,
        );

        assert!(block.contains("Final grades detected (2): 85.00, 91.00"));
        assert!(block.contains("Average final grade: 88.00"));
    }

    #[test]
    fn test_failed_block_names_path() {
        console::set_colors_enabled(false);
        let block = format_document(
            DocumentKind::Invoice,
            &report(DocumentOutcome::Failed {
                error: "image error: bad header".to_string(),
            }),
            15,
        );

        assert!(block.contains("Failed to process scans/doc.png: image error: bad header"));
    }
}
