//! Final grade extraction for scanned report cards.
//!
//! A report card usually prints a header naming the final grade column,
//! one subject per line with the final grade as the rightmost figure, and an
//! observations block after the table. The extractor looks for the header,
//! walks the following lines taking the last in-range number of each, and
//! stops at the terminator. Without a header it scans the whole document.

use rust_decimal::Decimal;
use tracing::debug;

use super::matcher::{LineMatcher, SubstringMatcher};
use super::numeral::normalize;
use super::patterns::GRADE_NUMBER;
use super::{split_lines, DocumentExtractor};
use crate::models::config::{Bounds, GradeConfig};
use crate::models::report::{DocumentKind, Findings, GradeFindings};

/// Grades found in one document and where the scan started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeSection {
    /// Index of the header line, if one was found.
    pub header_index: Option<usize>,
    /// Accepted grades in line order, without duplicates.
    pub grades: Vec<Decimal>,
}

/// Last number on a line whose value lies within `bounds`.
///
/// Report card lines often carry a subject code and partial scores before the
/// final grade, so candidates are tried from the end of the line.
pub fn last_number_in(line: &str, bounds: Bounds) -> Option<Decimal> {
    let tokens: Vec<&str> = GRADE_NUMBER.find_iter(line).map(|m| m.as_str()).collect();

    tokens
        .into_iter()
        .rev()
        .filter_map(|token| normalize(token).ok())
        .find(|value| bounds.contains(*value))
}

/// Arithmetic mean, `None` for an empty sequence.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().sum();
    Some(sum / Decimal::from(values.len()))
}

/// Extracts the final grade column from report card text.
#[derive(Debug)]
pub struct GradeExtractor {
    header_matcher: Box<dyn LineMatcher>,
    terminator_matcher: Box<dyn LineMatcher>,
    line_bounds: Bounds,
    accept_bounds: Bounds,
}

impl GradeExtractor {
    pub fn from_config(config: &GradeConfig) -> Self {
        Self {
            header_matcher: Box::new(SubstringMatcher::new(&config.header_keywords)),
            terminator_matcher: Box::new(SubstringMatcher::new(&config.terminators)),
            line_bounds: config.line_bounds,
            accept_bounds: config.accept_bounds,
        }
    }

    /// Replace the header line matcher.
    pub fn with_header_matcher(mut self, matcher: impl LineMatcher + 'static) -> Self {
        self.header_matcher = Box::new(matcher);
        self
    }

    /// Replace the section terminator matcher.
    pub fn with_terminator_matcher(mut self, matcher: impl LineMatcher + 'static) -> Self {
        self.terminator_matcher = Box::new(matcher);
        self
    }

    /// Set the range a grade must fall in to be kept.
    pub fn with_accept_bounds(mut self, bounds: Bounds) -> Self {
        self.accept_bounds = bounds;
        self
    }

    /// Index of the first line matching the header matcher.
    pub fn find_header(&self, lines: &[&str]) -> Option<usize> {
        lines
            .iter()
            .enumerate()
            .find(|(i, line)| self.header_matcher.matches_at(*i, line))
            .map(|(i, _)| i)
    }

    /// Scan the text for final grades.
    pub fn extract_section(&self, text: &str) -> GradeSection {
        let lines = split_lines(text);
        let header_index = self.find_header(&lines);

        let start = match header_index {
            Some(index) => {
                debug!("Final grade header found at line {}", index);
                index + 1
            }
            None => {
                debug!("No final grade header, scanning the whole document");
                0
            }
        };

        let mut raw = Vec::new();
        for (index, line) in lines.iter().enumerate().skip(start) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if self.terminator_matcher.matches_at(index, line) {
                debug!("Grade section ends at line {}", index);
                break;
            }
            if let Some(value) = last_number_in(line, self.line_bounds) {
                raw.push(value);
            }
        }

        let mut grades: Vec<Decimal> = Vec::new();
        let mut seen: Vec<Decimal> = Vec::new();
        for value in raw.into_iter().filter(|v| self.accept_bounds.contains(*v)) {
            // OCR sometimes repeats a line
            let key = value.round_dp(2);
            if !seen.contains(&key) {
                seen.push(key);
                grades.push(value);
            }
        }

        debug!("Extracted {} final grades", grades.len());

        GradeSection {
            header_index,
            grades,
        }
    }

    /// Scan the text and summarize the grades with their mean.
    pub fn analyze(&self, text: &str) -> GradeFindings {
        let section = self.extract_section(text);
        match mean(&section.grades) {
            Some(mean) => GradeFindings::Grades {
                grades: section.grades,
                mean,
            },
            None => GradeFindings::NoGrades,
        }
    }
}

impl Default for GradeExtractor {
    fn default() -> Self {
        Self::from_config(&GradeConfig::default())
    }
}

impl DocumentExtractor for GradeExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::ReportCard
    }

    fn extract(&self, text: &str) -> Findings {
        Findings::Grades(self.analyze(text))
    }
}
