//! Configuration structures for the extraction pipelines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the tally pipelines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    /// Input directories and file filtering.
    pub input: InputConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Image enhancement applied before OCR.
    pub preprocessing: PreprocessConfig,

    /// Invoice total extraction.
    pub invoice: InvoiceConfig,

    /// Report card grade extraction.
    pub grades: GradeConfig,
}

/// Where documents are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory holding scanned invoices.
    pub invoice_dir: PathBuf,

    /// Directory holding scanned report cards.
    pub report_card_dir: PathBuf,

    /// Accepted file extensions, compared case-insensitively.
    pub extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            invoice_dir: PathBuf::from("invoices"),
            report_card_dir: PathBuf::from("report-cards"),
            extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
        }
    }
}

impl InputConfig {
    /// Check whether a file extension is eligible for processing.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Tesseract invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Path or name of the tesseract binary.
    pub tesseract_path: PathBuf,

    /// Directory with traineddata files, exported as `TESSDATA_PREFIX`.
    pub tessdata_dir: Option<PathBuf>,

    /// Recognition languages, joined with `+`.
    pub languages: Vec<String>,

    /// OCR engine mode (`--oem`). 3 selects legacy plus LSTM.
    pub engine_mode: u8,

    /// Page segmentation mode (`--psm`). 6 assumes a uniform block of text.
    pub page_segmentation: u8,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: PathBuf::from("tesseract"),
            tessdata_dir: None,
            languages: vec!["eng".to_string(), "spa".to_string()],
            engine_mode: 3,
            page_segmentation: 6,
        }
    }
}

impl OcrConfig {
    /// Language argument in the form tesseract expects (`eng+spa`).
    pub fn language_arg(&self) -> String {
        self.languages.join("+")
    }
}

/// Image enhancement parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Images whose longer side is below this are upscaled.
    pub min_long_side: u32,

    /// Upscale factor for small images.
    pub upscale_factor: f32,

    /// Contrast factor (1.0 keeps the image unchanged).
    pub contrast: f32,

    /// Sharpness factor (1.0 keeps the image unchanged).
    pub sharpness: f32,

    /// Median filter radius; 1 gives a 3x3 window, 0 disables the filter.
    pub median_radius: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            min_long_side: 1600,
            upscale_factor: 1.6,
            contrast: 1.6,
            sharpness: 1.2,
            median_radius: 1,
        }
    }
}

/// Which rule picks the total among the monetary candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalPolicyKind {
    /// The largest detected amount.
    #[default]
    Largest,
    /// The largest amount printed on a line carrying a total keyword.
    KeywordLine,
}

/// Invoice extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceConfig {
    /// Phrases signalling that a total is printed on the document.
    pub total_keywords: Vec<String>,

    /// Maximum number of candidates listed in a report.
    pub max_listed: usize,

    /// Total selection rule.
    pub total_policy: TotalPolicyKind,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            total_keywords: [
                "TOTAL",
                "Total",
                "Amount Due",
                "AMOUNT DUE",
                "Grand Total",
                "GRAND TOTAL",
                "Importe Total",
                "IMPORTE TOTAL",
                "Total a pagar",
                "TOTAL A PAGAR",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            max_listed: 15,
            total_policy: TotalPolicyKind::Largest,
        }
    }
}

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Decimal,
    pub max: Decimal,
}

impl Bounds {
    pub fn new(min: impl Into<Decimal>, max: impl Into<Decimal>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Check whether a value lies within the range, ends included.
    pub fn contains(&self, value: Decimal) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Report card extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeConfig {
    /// Keywords identifying the final grade header line.
    pub header_keywords: Vec<String>,

    /// Keywords closing the grade section.
    pub terminators: Vec<String>,

    /// Range a number must fall in to be taken as a line's grade.
    pub line_bounds: Bounds,

    /// Range a grade must fall in to be kept in the final sequence.
    pub accept_bounds: Bounds,
}

impl Default for GradeConfig {
    fn default() -> Self {
        Self {
            header_keywords: ["NOTA FINAL", "NOTA  FINAL", "FINAL", "N. FINAL"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            terminators: vec!["OBSERVACIONES".to_string()],
            line_bounds: Bounds::new(0, 100),
            accept_bounds: Bounds::new(30, 100),
        }
    }
}

impl TallyConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let config = GradeConfig::default();
        assert!(config.accept_bounds.contains(Decimal::from(30)));
        assert!(config.accept_bounds.contains(Decimal::from(100)));
        assert!(!config.accept_bounds.contains(Decimal::from(29)));
        assert!(config.line_bounds.contains(Decimal::ZERO));
    }

    #[test]
    fn test_extension_filter() {
        let input = InputConfig::default();
        assert!(input.accepts_extension("PNG"));
        assert!(input.accepts_extension("jpeg"));
        assert!(!input.accepts_extension("tiff"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: TallyConfig =
            serde_json::from_str(r#"{"ocr": {"languages": ["eng"]}}"#).unwrap();
        assert_eq!(config.ocr.language_arg(), "eng");
        assert_eq!(config.ocr.page_segmentation, 6);
        assert_eq!(config.invoice.max_listed, 15);
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = TallyConfig::default();
        config.invoice.total_policy = TotalPolicyKind::KeywordLine;
        config.save(&path).unwrap();

        let loaded = TallyConfig::from_file(&path).unwrap();
        assert_eq!(loaded.invoice.total_policy, TotalPolicyKind::KeywordLine);
        assert_eq!(loaded.grades.accept_bounds, config.grades.accept_bounds);
    }
}
