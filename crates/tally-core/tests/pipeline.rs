//! Batch behavior with a scripted text source.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use tally_core::error::OcrError;
use tally_core::models::config::TallyConfig;
use tally_core::{
    BatchEvent, BatchRunner, BatchStatus, DocumentKind, DocumentOutcome, Findings, GradeExtractor,
    GradeFindings, InvoiceFindings, MoneyExtractor, Pipelines, Result, TallyError, TextSource,
};

/// Returns canned text per file name; names without text fail like a broken OCR run.
struct ScriptedSource {
    texts: HashMap<&'static str, &'static str>,
}

impl ScriptedSource {
    fn new(texts: &[(&'static str, &'static str)]) -> Self {
        Self {
            texts: texts.iter().copied().collect(),
        }
    }
}

impl TextSource for ScriptedSource {
    fn text_for(&self, path: &Path) -> Result<String> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        match self.texts.get(name) {
            Some(text) => Ok(text.to_string()),
            None => Err(TallyError::Ocr(OcrError::Recognition {
                status: "exit status: 1".to_string(),
                stderr: format!("cannot read {}", name),
            })),
        }
    }
}

fn touch(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), b"scan").unwrap();
    }
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn failing_document_does_not_stop_batch() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), &["1.png", "2.png", "3.png"]);

    let source = ScriptedSource::new(&[
        ("1.png", "TOTAL 1,200.00\nIVA 200.00"),
        ("3.png", "10.00 20.00"),
    ]);
    let extractor = MoneyExtractor::default();
    let report = BatchRunner::new(&source, &extractor).run(dir.path());

    assert_eq!(report.status, BatchStatus::Completed);
    assert_eq!(report.documents.len(), 3);
    assert_eq!(report.failed_count(), 1);

    let names: Vec<&str> = report.documents.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["1.png", "2.png", "3.png"]);

    assert_eq!(
        report.documents[0].outcome,
        DocumentOutcome::Extracted {
            findings: Findings::Invoice(InvoiceFindings::Total {
                total: dec("1200.00"),
                candidates: vec![dec("200.00"), dec("1200.00")],
            }),
        }
    );
    match &report.documents[1].outcome {
        DocumentOutcome::Failed { error } => assert!(error.contains("cannot read 2.png")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(
        report.documents[2].outcome,
        DocumentOutcome::Extracted {
            findings: Findings::Invoice(InvoiceFindings::Candidates {
                candidates: vec![dec("10.00"), dec("20.00")],
            }),
        }
    );
}

#[test]
fn every_document_failing_still_reports() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), &["a.jpg", "b.jpeg"]);

    let source = ScriptedSource::new(&[]);
    let extractor = GradeExtractor::default();
    let report = BatchRunner::new(&source, &extractor).run(dir.path());

    assert_eq!(report.kind, DocumentKind::ReportCard);
    assert_eq!(report.documents.len(), 2);
    assert_eq!(report.failed_count(), 2);
}

#[test]
fn missing_invoice_dir_does_not_skip_report_cards() {
    let root = tempfile::tempdir().unwrap();
    let cards = root.path().join("cards");
    fs::create_dir(&cards).unwrap();
    touch(&cards, &["boletin.png"]);

    let mut config = TallyConfig::default();
    config.input.invoice_dir = root.path().join("missing");
    config.input.report_card_dir = cards;

    let source = ScriptedSource::new(&[(
        "boletin.png",
        "Alumno: Ana\nASIGNATURA NOTA FINAL\nMatematicas 01 85\nCiencias 02 91\nOBSERVACIONES: bien",
    )]);

    let mut seen = Vec::new();
    let batches = Pipelines::from_config(&config).run_all(&source, &config, |event| match event {
        BatchEvent::Skipped { kind, .. } => seen.push((kind, "skipped".to_string())),
        BatchEvent::Started { kind, documents, .. } => seen.push((kind, documents.to_string())),
        BatchEvent::Document { kind, report } => seen.push((kind, report.name.clone())),
    });

    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].status, BatchStatus::MissingInput);
    assert!(batches[0].documents.is_empty());
    assert_eq!(batches[1].status, BatchStatus::Completed);
    assert_eq!(
        seen,
        vec![
            (DocumentKind::Invoice, "skipped".to_string()),
            (DocumentKind::ReportCard, "1".to_string()),
            (DocumentKind::ReportCard, "boletin.png".to_string()),
        ]
    );

    assert_eq!(
        batches[1].documents[0].outcome,
        DocumentOutcome::Extracted {
            findings: Findings::Grades(GradeFindings::Grades {
                grades: vec![dec("85"), dec("91")],
                mean: dec("88"),
            }),
        }
    );
}

#[test]
fn directory_without_images_is_no_content() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), &["readme.txt"]);

    let source = ScriptedSource::new(&[]);
    let extractor = MoneyExtractor::default();
    let report = BatchRunner::new(&source, &extractor).run(dir.path());

    assert_eq!(report.status, BatchStatus::NoContent);
    assert!(report.documents.is_empty());
}
