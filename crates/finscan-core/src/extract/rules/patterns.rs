//! Common regex patterns and fragments for field extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Signed amount: optional parentheses, minus, currency symbol and separators.
pub const AMOUNT: &str = r"\(?-?[$£€]?[ \t]?\d[\d,]*(?:\.\d+)?\)?";

/// Label/value separator on a single line (`Total: `, `Total - `, `Total `).
/// A hyphen counts only when spaced, so `Total -5.00` keeps its sign.
pub const SEP: &str = r"[ \t]*(?::|-[ \t])?[ \t]*";

/// Label/value separator that may also cross line breaks, for numeric values
/// that the recognizer placed on the line below their label.
pub const GAP: &str = r"[ \t]*(?::|-[ \t])?\s*";

/// Numeric date such as `01/31/2024` or `31-01-2024`.
pub const DATE: &str = r"\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4}";

lazy_static! {
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    pub static ref THOUSANDS_SEPARATOR: Regex = Regex::new(r"(\d),(\d{3})\b").unwrap();

    // Invoice line item on a normalized line: description, rate, quantity, total.
    // Rate and total may be negative, as `-5.00` or `(5.00)`.
    pub static ref LINE_ITEM: Regex = Regex::new(
        r"(?i)^(?P<description>.*?[a-z].*?) (?P<rate>\(?-?[$£€]?\d+(?:\.\d+)?\)?) (?P<quantity>\d+(?:\.\d+)?) (?P<total>\(?-?[$£€]?\d+(?:\.\d+)?\)?)$"
    ).unwrap();
}
