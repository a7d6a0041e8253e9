//! Document categories and extracted values.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of financial document submitted for processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    /// Supplier invoice with line items.
    Invoice,
    /// Employee payslip (earnings statement).
    Payslip,
    /// Profit and loss statement.
    ProfitLoss,
}

impl DocumentCategory {
    /// All supported categories, in display order.
    pub const ALL: [DocumentCategory; 3] = [
        DocumentCategory::Invoice,
        DocumentCategory::Payslip,
        DocumentCategory::ProfitLoss,
    ];

    /// Machine-readable name (`invoice`, `payslip`, `profit_loss`).
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Invoice => "invoice",
            DocumentCategory::Payslip => "payslip",
            DocumentCategory::ProfitLoss => "profit_loss",
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            DocumentCategory::Invoice => "Invoice",
            DocumentCategory::Payslip => "Payslip",
            DocumentCategory::ProfitLoss => "Profit & Loss",
        }
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "invoice" | "invoices" => Ok(DocumentCategory::Invoice),
            "payslip" | "payslips" => Ok(DocumentCategory::Payslip),
            "profit_loss" | "profit-loss" | "pnl" => Ok(DocumentCategory::ProfitLoss),
            other => Err(format!("unknown document category: {}", other)),
        }
    }
}

/// A normalized field value.
///
/// Serializes as the bare value. Text made of digits and decimals both come
/// out as JSON strings, so this type is write-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Whole number (e.g. profit-and-loss line values).
    Integer(i64),
    /// Monetary amount with its original scale.
    Decimal(Decimal),
    /// Free text (names, identifiers, dates).
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value, if it has one.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Integer(n) => Some(Decimal::from(*n)),
            FieldValue::Decimal(d) => Some(*d),
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// Field name to value mapping produced by the field extractor.
///
/// Every field declared by the category schema is present as a key; an
/// unmatched field maps to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedFields {
    values: HashMap<String, Option<FieldValue>>,

    /// Non-fatal problems seen while extracting.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ExtractedFields {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field value (or its absence).
    pub fn insert(&mut self, name: impl Into<String>, value: Option<FieldValue>) {
        self.values.insert(name.into(), value);
    }

    /// Whether `name` is a key at all.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Value for `name`; `None` when absent or unknown.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name).and_then(|v| v.as_ref())
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of keys that carry a value.
    pub fn matched_count(&self) -> usize {
        self.values.values().filter(|v| v.is_some()).count()
    }

    /// Iterate over all keys and values in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}

/// One invoice line item, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRecord {
    /// Product or service description.
    pub description: String,

    /// Unit rate.
    pub rate: Decimal,

    /// Quantity.
    pub quantity: Decimal,

    /// Line total as printed on the document.
    pub line_total: Decimal,
}

impl LineItemRecord {
    /// Whether `rate × quantity` agrees with the printed total within `tolerance`.
    ///
    /// Products that overflow `Decimal` count as inconsistent.
    pub fn is_consistent(&self, tolerance: Decimal) -> bool {
        self.rate
            .checked_mul(self.quantity)
            .and_then(|product| product.checked_sub(self.line_total))
            .is_some_and(|diff| diff.abs() <= tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_str() {
        assert_eq!("invoice".parse::<DocumentCategory>(), Ok(DocumentCategory::Invoice));
        assert_eq!("Payslip".parse::<DocumentCategory>(), Ok(DocumentCategory::Payslip));
        assert_eq!("profit-loss".parse::<DocumentCategory>(), Ok(DocumentCategory::ProfitLoss));
        assert_eq!("profit_loss".parse::<DocumentCategory>(), Ok(DocumentCategory::ProfitLoss));
        assert!("receipt".parse::<DocumentCategory>().is_err());
    }

    #[test]
    fn test_category_serde_name() {
        let json = serde_json::to_string(&DocumentCategory::ProfitLoss).unwrap();
        assert_eq!(json, "\"profit_loss\"");
    }

    #[test]
    fn test_extracted_fields_absent_keys() {
        let mut fields = ExtractedFields::new();
        fields.insert("Net Pay", None);
        fields.insert("Gross Wages", Some(FieldValue::Integer(5000)));

        assert!(fields.contains("Net Pay"));
        assert!(fields.get("Net Pay").is_none());
        assert_eq!(fields.get("Gross Wages"), Some(&FieldValue::Integer(5000)));
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.matched_count(), 1);
    }

    #[test]
    fn test_line_item_consistency() {
        let item = LineItemRecord {
            description: "Consulting".to_string(),
            rate: Decimal::new(15000, 2),
            quantity: Decimal::from(3),
            line_total: Decimal::new(45000, 2),
        };
        assert!(item.is_consistent(Decimal::new(1, 2)));

        let off = LineItemRecord {
            line_total: Decimal::new(40000, 2),
            ..item
        };
        assert!(!off.is_consistent(Decimal::new(1, 2)));
    }

    #[test]
    fn test_line_item_overflow_is_inconsistent() {
        let item = LineItemRecord {
            description: "Garbled".to_string(),
            rate: Decimal::MAX,
            quantity: Decimal::from(2),
            line_total: Decimal::ONE,
        };
        assert!(!item.is_consistent(Decimal::new(1, 2)));

        let item = LineItemRecord {
            rate: Decimal::ONE,
            quantity: Decimal::ONE,
            line_total: Decimal::MIN,
            ..item
        };
        assert!(!item.is_consistent(Decimal::new(1, 2)));
    }

    #[test]
    fn test_field_value_serializes_bare() {
        let json = serde_json::to_string(&[
            FieldValue::Text("004512".to_string()),
            FieldValue::Decimal(Decimal::new(150000, 2)),
            FieldValue::Integer(-42),
        ])
        .unwrap();
        assert_eq!(json, r#"["004512","1500.00",-42]"#);
    }
}
