//! Rule-based field extractors.

pub mod numbers;
pub mod patterns;

pub use numbers::{
    decimal_value, integer_value, parse_amount, parse_integer, strip_thousands_separators,
    text_value,
};
pub use patterns::*;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::models::document::FieldValue;

/// Converts the matched value text into a typed value.
pub type Normalizer = fn(&str) -> Option<FieldValue>;

/// Type of value a rule produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Text,
    Integer,
    Decimal,
}

impl ValueKind {
    fn normalizer(self) -> Normalizer {
        match self {
            ValueKind::Text => text_value,
            ValueKind::Integer => integer_value,
            ValueKind::Decimal => decimal_value,
        }
    }
}

/// A named extraction rule.
///
/// The pattern is compiled case-insensitive and multi-line. The value is read
/// from the `value` capture group (or group 1 when there is none). A match in
/// which the optional `skip` group participates is ignored, so a rule can step
/// over look-alike labels such as `YTD NET PAY` when looking for `NET PAY`.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Field name, also the row label in the output table.
    pub name: &'static str,
    pub pattern: Regex,
    pub normalize: Normalizer,
    pub kind: ValueKind,
    /// Whether a missing match fails the run.
    pub required: bool,
}

/// The first usable match of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch<'t> {
    /// Raw value text before normalization.
    pub raw: &'t str,
    /// Byte span of the whole match.
    pub position: (usize, usize),
}

impl FieldRule {
    /// Compile a rule with the default normalizer for `kind`.
    pub fn new(name: &'static str, pattern: &str, kind: ValueKind) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .multi_line(true)
            .build()?;

        Ok(Self {
            name,
            pattern,
            normalize: kind.normalizer(),
            kind,
            required: false,
        })
    }

    /// Mark the field as mandatory.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Replace the normalizer.
    pub fn with_normalizer(mut self, normalize: Normalizer) -> Self {
        self.normalize = normalize;
        self
    }

    /// First match that is not a skipped look-alike.
    pub fn find<'t>(&self, text: &'t str) -> Option<RuleMatch<'t>> {
        self.pattern
            .captures_iter(text)
            .filter(|caps| caps.name("skip").is_none())
            .find_map(|caps| {
                let whole = caps.get(0)?;
                let value = caps.name("value").or_else(|| caps.get(1))?;
                Some(RuleMatch {
                    raw: value.as_str(),
                    position: (whole.start(), whole.end()),
                })
            })
    }
}
