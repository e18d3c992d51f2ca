//! Monetary candidate extraction for scanned invoices.

use std::fmt;

use rust_decimal::Decimal;
use tracing::debug;

use super::matcher::{LineMatcher, SubstringMatcher};
use super::numeral::normalize;
use super::patterns::MONEY_PATTERN;
use super::{split_lines, DocumentExtractor};
use crate::models::config::{InvoiceConfig, TotalPolicyKind};
use crate::models::report::{DocumentKind, Findings, InvoiceFindings};

/// Result of scanning one invoice text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyScan {
    /// Unique normalized amounts, ascending.
    pub candidates: Vec<Decimal>,
    /// Whether a total keyword appears anywhere in the text.
    pub has_total_keyword: bool,
}

/// Chooses the total among the monetary candidates.
pub trait TotalPolicy: Send + Sync + fmt::Debug {
    fn select(
        &self,
        text: &str,
        candidates: &[Decimal],
        keywords: &dyn LineMatcher,
    ) -> Option<Decimal>;
}

/// Takes the largest detected amount as the total.
///
/// Printed grand totals are usually the biggest figure on an invoice. This is
/// not guaranteed: a document listing a larger unrelated number fools it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LargestAmount;

impl TotalPolicy for LargestAmount {
    fn select(
        &self,
        _text: &str,
        candidates: &[Decimal],
        _keywords: &dyn LineMatcher,
    ) -> Option<Decimal> {
        candidates.iter().max().copied()
    }
}

/// Takes the largest amount printed on a line that carries a total keyword.
///
/// Falls back to [`LargestAmount`] when no keyword line holds an amount.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordLine;

impl TotalPolicy for KeywordLine {
    fn select(
        &self,
        text: &str,
        candidates: &[Decimal],
        keywords: &dyn LineMatcher,
    ) -> Option<Decimal> {
        let on_keyword_lines = split_lines(text)
            .into_iter()
            .enumerate()
            .filter(|(i, line)| keywords.matches_at(*i, line))
            .flat_map(|(_, line)| scan_amounts(line))
            .filter(|amount| candidates.contains(amount))
            .max();

        on_keyword_lines.or_else(|| LargestAmount.select(text, candidates, keywords))
    }
}

/// Build the policy named in configuration.
pub fn policy_for(kind: TotalPolicyKind) -> Box<dyn TotalPolicy> {
    match kind {
        TotalPolicyKind::Largest => Box::new(LargestAmount),
        TotalPolicyKind::KeywordLine => Box::new(KeywordLine),
    }
}

/// Money-shaped amounts in discovery order, unparseable matches dropped.
fn scan_amounts(text: &str) -> impl Iterator<Item = Decimal> + '_ {
    MONEY_PATTERN
        .find_iter(text)
        .filter_map(|m| normalize(m.as_str()).ok())
}

/// Scans invoice text for amounts and a total label.
#[derive(Debug)]
pub struct MoneyExtractor {
    total_matcher: Box<dyn LineMatcher>,
    policy: Box<dyn TotalPolicy>,
}

impl MoneyExtractor {
    /// Create an extractor with the given total keywords and the largest-amount policy.
    pub fn new<I, S>(total_keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            total_matcher: Box::new(SubstringMatcher::new(total_keywords)),
            policy: Box::new(LargestAmount),
        }
    }

    pub fn from_config(config: &InvoiceConfig) -> Self {
        Self::new(&config.total_keywords).with_policy(policy_for(config.total_policy))
    }

    /// Replace the total keyword matcher.
    pub fn with_matcher(mut self, matcher: impl LineMatcher + 'static) -> Self {
        self.total_matcher = Box::new(matcher);
        self
    }

    /// Replace the total selection policy.
    pub fn with_policy(mut self, policy: Box<dyn TotalPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Collect unique amounts (ascending) and detect a total keyword.
    pub fn scan(&self, text: &str) -> MoneyScan {
        let mut candidates: Vec<Decimal> = Vec::new();
        for amount in scan_amounts(text) {
            if !candidates.contains(&amount) {
                candidates.push(amount);
            }
        }
        candidates.sort();

        let has_total_keyword = self.has_total_keyword(text);

        debug!(
            "Found {} money candidates, total keyword present: {}",
            candidates.len(),
            has_total_keyword
        );

        MoneyScan {
            candidates,
            has_total_keyword,
        }
    }

    /// Check for a total keyword anywhere in the text, including across line breaks.
    pub fn has_total_keyword(&self, text: &str) -> bool {
        self.total_matcher.matches(text)
    }

    /// Scan the text and apply the reporting policy.
    pub fn analyze(&self, text: &str) -> InvoiceFindings {
        let scan = self.scan(text);

        if scan.candidates.is_empty() {
            return InvoiceFindings::NoAmounts;
        }

        if scan.has_total_keyword {
            if let Some(total) =
                self.policy.select(text, &scan.candidates, self.total_matcher.as_ref())
            {
                return InvoiceFindings::Total {
                    total,
                    candidates: scan.candidates,
                };
            }
        }

        InvoiceFindings::Candidates {
            candidates: scan.candidates,
        }
    }
}

impl Default for MoneyExtractor {
    fn default() -> Self {
        Self::from_config(&InvoiceConfig::default())
    }
}

impl DocumentExtractor for MoneyExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Invoice
    }

    fn extract(&self, text: &str) -> Findings {
        Findings::Invoice(self.analyze(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_total_with_keyword() {
        let extractor = MoneyExtractor::default();
        let text = "Total: $1,200.00 and 50.00";

        let scan = extractor.scan(text);
        assert_eq!(scan.candidates, vec![dec("50.00"), dec("1200.00")]);
        assert!(scan.has_total_keyword);

        assert_eq!(
            extractor.analyze(text),
            InvoiceFindings::Total {
                total: dec("1200.00"),
                candidates: vec![dec("50.00"), dec("1200.00")],
            }
        );
    }

    #[test]
    fn test_candidates_without_keyword() {
        let extractor = MoneyExtractor::default();
        assert_eq!(
            extractor.analyze("50.00 75.25"),
            InvoiceFindings::Candidates {
                candidates: vec![dec("50.00"), dec("75.25")],
            }
        );
    }

    #[test]
    fn test_no_amounts() {
        let extractor = MoneyExtractor::default();
        assert_eq!(
            extractor.analyze("Thank you for your purchase"),
            InvoiceFindings::NoAmounts
        );
        assert_eq!(extractor.analyze("TOTAL A PAGAR"), InvoiceFindings::NoAmounts);
    }

    #[test]
    fn test_unparseable_amount_is_dropped() {
        let extractor = MoneyExtractor::default();
        assert_eq!(
            extractor.analyze("TOTAL 1,234,56 and 10.00"),
            InvoiceFindings::Total {
                total: dec("10.00"),
                candidates: vec![dec("10.00")],
            }
        );
        assert_eq!(extractor.analyze("IVA 1,234,56"), InvoiceFindings::NoAmounts);
    }

    #[test]
    fn test_mixed_locales_deduplicate() {
        let extractor = MoneyExtractor::default();
        let text = "Importe total 1.234,56\nBalance 1,234.56\nIVA 12,50\nIVA 12.50";
        let scan = extractor.scan(text);
        assert_eq!(scan.candidates, vec![dec("12.50"), dec("1234.56")]);
        assert!(scan.has_total_keyword);
    }

    #[test]
    fn test_keyword_line_policy() {
        let extractor = MoneyExtractor::default().with_policy(Box::new(KeywordLine));
        let text = "Deposit received 9,999.00\nSubtotal 100.00\nTOTAL A PAGAR 121.00";

        match extractor.analyze(text) {
            InvoiceFindings::Total { total, candidates } => {
                assert_eq!(total, dec("121.00"));
                assert_eq!(candidates.len(), 3);
            }
            other => panic!("expected a total, got {:?}", other),
        }
    }

    #[test]
    fn test_keyword_line_policy_with_carriage_returns() {
        let extractor = MoneyExtractor::default().with_policy(Box::new(KeywordLine));
        let text = "Deposit received 9,999.00\rSubtotal 100.00\rTOTAL A PAGAR 121.00";
        assert_eq!(
            extractor.analyze(text),
            InvoiceFindings::Total {
                total: dec("121.00"),
                candidates: vec![dec("100.00"), dec("121.00"), dec("9999.00")],
            }
        );
    }

    #[test]
    fn test_keyword_line_policy_falls_back_to_largest() {
        let extractor = MoneyExtractor::default().with_policy(Box::new(KeywordLine));
        let text = "GRAND TOTAL\n10.00\n250.75";
        assert_eq!(
            extractor.analyze(text),
            InvoiceFindings::Total {
                total: dec("250.75"),
                candidates: vec![dec("10.00"), dec("250.75")],
            }
        );
    }

    #[test]
    fn test_custom_matcher() {
        let extractor =
            MoneyExtractor::default().with_matcher(SubstringMatcher::new(["SUMA"]));
        assert!(matches!(
            extractor.analyze("Total 10.00"),
            InvoiceFindings::Candidates { .. }
        ));
        assert!(matches!(
            extractor.analyze("Suma 10.00"),
            InvoiceFindings::Total { .. }
        ));
    }
}
