//! Numeral normalization for mixed US and European punctuation.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ExtractionError;

/// Normalize a numeral token such as `1.234,56` or `1,234.56` into a decimal value.
///
/// When both `.` and `,` appear, whichever occurs last is the decimal separator
/// and the other is dropped as thousands grouping. A lone comma is a decimal
/// comma. Repeated dots keep only the last one as the decimal point.
pub fn normalize(token: &str) -> Result<Decimal, ExtractionError> {
    let unparseable = || ExtractionError::UnparseableNumeral(token.to_string());

    let cleaned: String = token.trim().chars().filter(|c| *c != ' ').collect();
    if cleaned.is_empty() {
        return Err(unparseable());
    }

    let canonical = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) if cleaned.matches(',').count() == 1 => cleaned.replace(',', "."),
        (None, Some(dot)) if cleaned.matches('.').count() > 1 => {
            let (integer, fraction) = cleaned.split_at(dot);
            format!("{}{}", integer.replace('.', ""), fraction)
        }
        _ => cleaned,
    };

    Decimal::from_str(&canonical).map_err(|_| unparseable())
}

/// Format an amount with comma grouping and two decimals (1,234.56).
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.round_dp(2));
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };

    let Some((integer_part, decimal_part)) = digits.split_once('.') else {
        return s;
    };

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    format!("{}{}.{}", sign, formatted, decimal_part)
}
