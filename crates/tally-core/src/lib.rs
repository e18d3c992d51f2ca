//! Core library for reconciling noisy OCR text into numeric facts.
//!
//! This crate provides:
//! - Locale-tolerant numeral normalization (`1.234,56` and `1,234.56`)
//! - Monetary candidate and total extraction for scanned invoices
//! - Final grade section extraction for scanned report cards
//! - Image enhancement and Tesseract OCR as text sources
//! - Batch drivers that isolate per-document failures

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pipeline;

pub use error::{DocumentError, ExtractionError, OcrError, PipelineError, Result, TallyError};
pub use extract::{
    format_amount, normalize, DocumentExtractor, GradeExtractor, LineMatcher, MoneyExtractor,
    TotalPolicy,
};
pub use models::config::TallyConfig;
pub use models::report::{
    BatchReport, BatchStatus, DocumentKind, DocumentOutcome, DocumentReport, Findings,
    GradeFindings, InvoiceFindings,
};
pub use ocr::{
    ImagePreprocessor, OcrTextSource, PlainTextSource, TesseractEngine, TextRecognizer, TextSource,
};
pub use pipeline::{discover_images, BatchEvent, BatchRunner, Pipelines};
