//! Conversion of extraction results into ordered table rows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::document::{ExtractedFields, FieldValue, LineItemRecord};
use crate::schema::CategorySchema;

/// Column headers for field rows.
pub const FIELD_HEADERS: [&str; 2] = ["Field", "Value"];

/// Column headers for line-item rows.
pub const LINE_ITEM_HEADERS: [&str; 4] = ["Description", "Rate", "Quantity", "Line Total"];

/// One `(field, value)` row. An absent value renders as an empty cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRow {
    #[serde(rename = "Field")]
    pub field: String,
    #[serde(rename = "Value")]
    pub value: Option<FieldValue>,
}

impl FieldRow {
    pub fn cells(&self) -> [String; 2] {
        [
            self.field.clone(),
            self.value.as_ref().map(ToString::to_string).unwrap_or_default(),
        ]
    }
}

/// One line-item row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRow {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Rate")]
    pub rate: Decimal,
    #[serde(rename = "Quantity")]
    pub quantity: Decimal,
    #[serde(rename = "Line Total")]
    pub line_total: Decimal,
}

impl LineItemRow {
    pub fn cells(&self) -> [String; 4] {
        [
            self.description.clone(),
            self.rate.to_string(),
            self.quantity.to_string(),
            self.line_total.to_string(),
        ]
    }
}

impl From<&LineItemRecord> for LineItemRow {
    fn from(record: &LineItemRecord) -> Self {
        Self {
            description: record.description.clone(),
            rate: record.rate,
            quantity: record.quantity,
            line_total: record.line_total,
        }
    }
}

/// Field rows in the schema's declared order, one per declared field.
pub fn to_field_rows(fields: &ExtractedFields, schema: &CategorySchema) -> Vec<FieldRow> {
    schema
        .field_names()
        .map(|name| FieldRow {
            field: name.to_string(),
            value: fields.get(name).cloned(),
        })
        .collect()
}

/// Line-item rows in record order; may be empty.
pub fn to_line_item_rows(records: &[LineItemRecord]) -> Vec<LineItemRow> {
    records.iter().map(LineItemRow::from).collect()
}
