//! Numeric and text normalizers for matched field values.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::document::FieldValue;

use super::patterns::{THOUSANDS_SEPARATOR, WHITESPACE_RUN};

/// Parse a printed amount such as `$45,000.00`, `(1,234.56)` or `-12`.
///
/// Currency symbols, whitespace and thousands separators are dropped. A value
/// opened with a parenthesis, or with a leading minus, is negative.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    // OCR sometimes drops the closing parenthesis; the opening one decides the sign.
    let negative = trimmed.starts_with('(');
    let body = trimmed.trim_start_matches('(').trim_end_matches(')');

    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, '$' | '£' | '€' | ',') && !c.is_whitespace())
        .collect();

    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (!negative, rest.to_string()),
        None => (negative, cleaned),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    let value = Decimal::from_str(&digits).ok()?;
    Some(if negative { -value } else { value })
}

/// Parse a whole-number amount; a zero fractional part is accepted.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let value = parse_amount(raw)?;
    if !value.fract().is_zero() {
        return None;
    }
    value.trunc().to_i64()
}

/// Normalizer producing [`FieldValue::Decimal`].
pub fn decimal_value(raw: &str) -> Option<FieldValue> {
    parse_amount(raw).map(FieldValue::Decimal)
}

/// Normalizer producing [`FieldValue::Integer`].
pub fn integer_value(raw: &str) -> Option<FieldValue> {
    parse_integer(raw).map(FieldValue::Integer)
}

/// Normalizer producing trimmed, whitespace-collapsed [`FieldValue::Text`].
pub fn text_value(raw: &str) -> Option<FieldValue> {
    let collapsed = WHITESPACE_RUN.replace_all(raw.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(FieldValue::Text(collapsed.into_owned()))
    }
}

/// Remove thousands-separator commas between digit groups (`1,234,567` → `1234567`).
pub fn strip_thousands_separators(s: &str) -> String {
    let mut current = s.to_string();
    // Adjacent groups share a digit, so one pass only removes every other comma.
    loop {
        let next = THOUSANDS_SEPARATOR.replace_all(&current, "$1$2").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}
