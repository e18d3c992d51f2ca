//! Text acquisition: image enhancement plus OCR, or plain text files.

mod preprocessing;
mod tesseract;

pub use preprocessing::ImagePreprocessor;
pub use tesseract::TesseractEngine;

use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use crate::error::{OcrError, Result};
use crate::models::config::TallyConfig;

/// Converts an image into raw text.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> std::result::Result<String, OcrError>;
}

/// Produces the text of a document given its path.
pub trait TextSource: Send + Sync {
    fn text_for(&self, path: &Path) -> Result<String>;
}

/// Decodes an image, enhances it and runs OCR on it.
pub struct OcrTextSource<R: TextRecognizer> {
    preprocessor: ImagePreprocessor,
    recognizer: R,
}

impl<R: TextRecognizer> OcrTextSource<R> {
    pub fn new(preprocessor: ImagePreprocessor, recognizer: R) -> Self {
        Self {
            preprocessor,
            recognizer,
        }
    }
}

impl OcrTextSource<TesseractEngine> {
    /// Tesseract-backed source built from configuration.
    pub fn from_config(config: &TallyConfig) -> Self {
        Self::new(
            ImagePreprocessor::with_config(config.preprocessing.clone()),
            TesseractEngine::new(config.ocr.clone()),
        )
    }
}

impl<R: TextRecognizer> TextSource for OcrTextSource<R> {
    fn text_for(&self, path: &Path) -> Result<String> {
        let image = image::open(path)?;
        let enhanced = self.preprocessor.enhance(&image);
        let text = self.recognizer.recognize(&enhanced)?;
        debug!("Recognized {} lines from {}", text.lines().count(), path.display());
        Ok(text)
    }
}

/// Reads documents that are already text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextSource;

impl TextSource for PlainTextSource {
    fn text_for(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }
}
