//! Numeral shapes recognized in OCR text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Money: grouped thousands with cents (1.234.567,89) or plain digits with cents (1234.56).
    // Separators are ambiguous; the normalizer decides which one is decimal.
    pub static ref MONEY_PATTERN: Regex = Regex::new(
        r"\d{1,3}(?:[.,]\d{3})*[.,]\d{2}|\d+[.,]\d{2}"
    ).unwrap();

    // Grade-sized numbers: up to three digits with an optional one or two digit fraction.
    pub static ref GRADE_NUMBER: Regex = Regex::new(
        r"\d{1,3}(?:[.,]\d{1,2})?"
    ).unwrap();
}
