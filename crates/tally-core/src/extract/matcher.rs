//! Line matchers used to spot keywords, headers and section terminators.
//!
//! Extraction only asks "does this line carry the label I am looking for",
//! so the matching strategy can be swapped without touching the extractors.

use std::fmt;
use std::ops::Range;

use regex::Regex;

use crate::error::ExtractionError;

/// Decides whether a line of OCR text carries a label.
pub trait LineMatcher: Send + Sync + fmt::Debug {
    /// Check a line regardless of its position.
    fn matches(&self, line: &str) -> bool;

    /// Check a line knowing its zero-based index in the document.
    fn matches_at(&self, _index: usize, line: &str) -> bool {
        self.matches(line)
    }
}

/// Case-insensitive substring search over a keyword set.
#[derive(Debug, Clone)]
pub struct SubstringMatcher {
    keywords: Vec<String>,
}

impl SubstringMatcher {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut upper: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref().to_uppercase();
            // Variants that only differ by case collapse here
            if !keyword.is_empty() && !upper.contains(&keyword) {
                upper.push(keyword);
            }
        }
        Self { keywords: upper }
    }

    /// Uppercased keywords, duplicates removed.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl LineMatcher for SubstringMatcher {
    fn matches(&self, line: &str) -> bool {
        let upper = line.to_uppercase();
        self.keywords.iter().any(|k| upper.contains(k.as_str()))
    }
}

/// Matches lines against a regular expression.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    pattern: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// Compile a pattern, reporting a malformed one as an extraction error.
    pub fn parse(pattern: &str) -> Result<Self, ExtractionError> {
        Regex::new(pattern)
            .map(Self::new)
            .map_err(|e| ExtractionError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }
}

impl LineMatcher for RegexMatcher {
    fn matches(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }
}

/// Restricts another matcher to a window of line indices.
///
/// Without position information (`matches`) the window is ignored.
#[derive(Debug)]
pub struct PositionalMatcher {
    inner: Box<dyn LineMatcher>,
    lines: Range<usize>,
}

impl PositionalMatcher {
    pub fn new(inner: impl LineMatcher + 'static, lines: Range<usize>) -> Self {
        Self {
            inner: Box::new(inner),
            lines,
        }
    }
}

impl LineMatcher for PositionalMatcher {
    fn matches(&self, line: &str) -> bool {
        self.inner.matches(line)
    }

    fn matches_at(&self, index: usize, line: &str) -> bool {
        self.lines.contains(&index) && self.inner.matches_at(index, line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_is_case_insensitive() {
        let matcher = SubstringMatcher::new(["Total a pagar"]);
        assert!(matcher.matches("total A PAGAR: 12,00"));
        assert!(!matcher.matches("Subtotal"));
    }

    #[test]
    fn test_substring_collapses_case_variants() {
        let matcher = SubstringMatcher::new(["TOTAL", "Total", "Grand Total", "GRAND TOTAL"]);
        assert_eq!(matcher.keywords(), ["TOTAL", "GRAND TOTAL"]);
    }

    #[test]
    fn test_regex_matcher() {
        let matcher = RegexMatcher::parse(r"(?i)^\s*nota\s+final").unwrap();
        assert!(matcher.matches("  Nota   Final"));
        assert!(!matcher.matches("Promedio nota final"));
        assert!(RegexMatcher::parse("(").is_err());
    }

    #[test]
    fn test_positional_window() {
        let matcher = PositionalMatcher::new(SubstringMatcher::new(["FINAL"]), 2..5);
        assert!(!matcher.matches_at(0, "NOTA FINAL"));
        assert!(matcher.matches_at(3, "NOTA FINAL"));
        assert!(!matcher.matches_at(5, "NOTA FINAL"));
        assert!(matcher.matches("NOTA FINAL"));
    }
}
