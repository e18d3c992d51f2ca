//! OCR backed by the `tesseract` command-line binary.

use std::process::Command;
use std::time::Instant;

use image::{DynamicImage, GenericImageView, ImageFormat};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::TextRecognizer;

/// Runs tesseract on a staged PNG and reads the text from stdout.
pub struct TesseractEngine {
    config: OcrConfig,
}

impl TesseractEngine {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Arguments following the input path.
    fn arguments(&self) -> Vec<String> {
        vec![
            "stdout".to_string(),
            "-l".to_string(),
            self.config.language_arg(),
            "--oem".to_string(),
            self.config.engine_mode.to_string(),
            "--psm".to_string(),
            self.config.page_segmentation.to_string(),
        ]
    }
}

impl TextRecognizer for TesseractEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        let staged = tempfile::Builder::new()
            .prefix("tally-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Staging(e.to_string()))?;

        image
            .save_with_format(staged.path(), ImageFormat::Png)
            .map_err(|e| OcrError::Staging(e.to_string()))?;

        let binary = self.config.tesseract_path.display().to_string();
        let mut command = Command::new(&self.config.tesseract_path);
        command.arg(staged.path()).args(self.arguments());
        if let Some(ref tessdata) = self.config.tessdata_dir {
            command.env("TESSDATA_PREFIX", tessdata);
        }

        debug!("Running {} on {}x{} image", binary, width, height);

        let output = command.output().map_err(|e| OcrError::Launch {
            binary: binary.clone(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(OcrError::Recognition {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8(output.stdout).map_err(|_| OcrError::InvalidOutput)?;

        info!(
            "OCR complete: {} characters in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_arguments() {
        let engine = TesseractEngine::new(OcrConfig::default());
        assert_eq!(
            engine.arguments(),
            ["stdout", "-l", "eng+spa", "--oem", "3", "--psm", "6"]
        );
    }

    #[test]
    fn test_missing_binary_is_launch_error() {
        let config = OcrConfig {
            tesseract_path: PathBuf::from("/nonexistent/tally-tesseract"),
            ..OcrConfig::default()
        };
        let engine = TesseractEngine::new(config);
        let image = DynamicImage::new_luma8(4, 4);

        match engine.recognize(&image) {
            Err(OcrError::Launch { binary, .. }) => {
                assert!(binary.contains("tally-tesseract"));
            }
            other => panic!("expected launch error, got {:?}", other),
        }
    }
}
