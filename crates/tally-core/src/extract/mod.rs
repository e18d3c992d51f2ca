//! Heuristic extraction of numeric facts from OCR text.

pub mod grades;
pub mod matcher;
pub mod money;
pub mod numeral;
pub mod patterns;

pub use grades::{GradeExtractor, GradeSection};
pub use matcher::{LineMatcher, PositionalMatcher, RegexMatcher, SubstringMatcher};
pub use money::{KeywordLine, LargestAmount, MoneyExtractor, MoneyScan, TotalPolicy};
pub use numeral::{format_amount, normalize};

use crate::models::report::{DocumentKind, Findings};

/// Split text into lines on every line boundary OCR output may carry.
///
/// Besides `\n` and `\r\n` this breaks on a lone `\r`, vertical tab, form
/// feed, the file/group/record separators, NEL and the Unicode line and
/// paragraph separators. A trailing boundary does not yield an empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        if !LINE_BOUNDARIES.contains(&c) {
            continue;
        }
        lines.push(&text[start..index]);
        start = index + c.len_utf8();
        if c == '\r' && chars.peek().is_some_and(|&(_, next)| next == '\n') {
            chars.next();
            start += 1;
        }
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

const LINE_BOUNDARIES: [char; 10] = [
    '\n', '\r', '\x0b', '\x0c', '\x1c', '\x1d', '\x1e', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Turns the text of one document into findings.
pub trait DocumentExtractor: Send + Sync {
    /// The document type this extractor understands.
    fn kind(&self) -> DocumentKind;

    /// Extract findings from plain text.
    fn extract(&self, text: &str) -> Findings;
}
