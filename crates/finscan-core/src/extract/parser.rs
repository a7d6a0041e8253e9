//! Field and line-item extraction over recognized text.

use std::time::Instant;

use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::models::document::{ExtractedFields, LineItemRecord};

use super::rules::{parse_amount, strip_thousands_separators, FieldRule, WHITESPACE_RUN};

/// Line items found in a document, with consistency warnings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItems {
    /// Records in source line order.
    pub records: Vec<LineItemRecord>,
    pub warnings: Vec<String>,
}

/// Applies field rules and the line-item pattern to recognized text.
#[derive(Debug, Clone)]
pub struct FieldParser {
    /// Allowed difference between `rate * quantity` and the line total.
    tolerance: Decimal,
}

impl Default for FieldParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldParser {
    pub fn new() -> Self {
        Self {
            tolerance: Decimal::new(1, 2),
        }
    }

    /// Set the line-item consistency tolerance.
    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Run every rule over `text`.
    ///
    /// Every rule name is present in the result. A rule without a usable match,
    /// or whose match fails to normalize, yields an absent value.
    pub fn extract_fields(&self, text: &str, rules: &[FieldRule]) -> ExtractedFields {
        let start = Instant::now();
        let mut fields = ExtractedFields::new();

        for rule in rules {
            let value = match rule.find(text) {
                Some(found) => match (rule.normalize)(found.raw) {
                    Some(value) => {
                        debug!("{} = {} at {:?}", rule.name, value, found.position);
                        Some(value)
                    }
                    None => {
                        fields.warnings.push(format!(
                            "{}: could not normalize '{}'",
                            rule.name,
                            found.raw.trim()
                        ));
                        None
                    }
                },
                None => None,
            };
            fields.insert(rule.name, value);
        }

        info!(
            "Matched {}/{} fields in {}ms",
            fields.matched_count(),
            rules.len(),
            start.elapsed().as_millis()
        );

        fields
    }

    /// Scan `text` line by line for line items.
    ///
    /// Lines are normalized first; lines that do not match `pattern` are
    /// skipped. `pattern` must define `description`, `rate`, `quantity` and
    /// `total` groups.
    pub fn extract_line_items(&self, text: &str, pattern: &Regex) -> LineItems {
        let mut items = LineItems::default();

        for (index, line) in text.lines().enumerate() {
            let line = normalize_line(line);
            if line.is_empty() {
                continue;
            }

            let Some(caps) = pattern.captures(&line) else {
                continue;
            };

            let group = |name: &str| caps.name(name).map(|m| m.as_str());
            let parsed = (
                group("rate").and_then(parse_amount),
                group("quantity").and_then(parse_amount),
                group("total").and_then(parse_amount),
            );
            let (Some(rate), Some(quantity), Some(line_total)) = parsed else {
                debug!("Line {} looked like an item but had bad numbers: {}", index + 1, line);
                continue;
            };

            let record = LineItemRecord {
                description: group("description").unwrap_or_default().trim().to_string(),
                rate,
                quantity,
                line_total,
            };

            if !record.is_consistent(self.tolerance) {
                items.warnings.push(format!(
                    "Line item '{}': {} x {} != {}",
                    record.description, record.rate, record.quantity, record.line_total
                ));
            }

            items.records.push(record);
        }

        debug!("Found {} line items", items.records.len());
        items
    }
}

/// Collapse whitespace runs and drop thousands separators.
pub fn normalize_line(line: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(line.trim(), " ");
    strip_thousands_separators(&collapsed)
}
