//! Error types for the tally-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the tally library.
#[derive(Error, Debug)]
pub enum TallyError {
    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Numeral or field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Batch-level input error.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Image decoding or encoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the OCR collaborator.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR binary could not be started.
    #[error("failed to launch {binary}: {reason}")]
    Launch { binary: String, reason: String },

    /// The OCR binary ran but reported failure.
    #[error("recognition failed (exit status {status}): {stderr}")]
    Recognition { status: String, stderr: String },

    /// The OCR binary produced output that is not UTF-8.
    #[error("OCR output is not valid UTF-8")]
    InvalidOutput,

    /// The enhanced image could not be handed to the OCR binary.
    #[error("failed to stage image for OCR: {0}")]
    Staging(String),
}

/// Errors related to numeral and field extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// A numeral token could not be normalized into a decimal value.
    #[error("unparseable numeral: {0:?}")]
    UnparseableNumeral(String),

    /// A configured pattern is not a valid regular expression.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Batch-level conditions that skip one pipeline without failing the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The configured input directory does not exist.
    #[error("input directory does not exist: {}", path.display())]
    MissingInput { path: PathBuf },

    /// The input directory holds no eligible images.
    #[error("no eligible images found in {}", path.display())]
    NoContent { path: PathBuf },

    /// The input path exists but cannot be listed as a directory.
    #[error("cannot read input directory {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },
}

/// A failure while turning one document into a result.
#[derive(Error, Debug)]
#[error("failed to process {}: {source}", path.display())]
pub struct DocumentError {
    /// The offending document.
    pub path: PathBuf,
    /// What went wrong.
    #[source]
    pub source: TallyError,
}

impl DocumentError {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<TallyError>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Result type for the tally library.
pub type Result<T> = std::result::Result<T, TallyError>;
