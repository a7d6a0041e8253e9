//! Per-category field schemas.
//!
//! A schema is everything that differs between document kinds: the ordered
//! field rules, whether line items are scanned, the binarization method and
//! what an extraction with no matches means.

mod invoice;
mod payslip;
mod profit_loss;

use regex::Regex;
use serde::Serialize;

use crate::extract::rules::{FieldRule, ValueKind};
use crate::models::document::DocumentCategory;
use crate::ocr::{Binarization, PageLayout};

/// Outcome when nothing in the recognized text matches the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroMatchPolicy {
    /// Succeed with every field present and absent.
    AllAbsent,
    /// Fail with `NoStructuredData`.
    Fail,
}

/// Extraction schema for one document category.
#[derive(Debug)]
pub struct CategorySchema {
    pub category: DocumentCategory,
    /// Field rules in declared (output) order.
    pub fields: Vec<FieldRule>,
    /// Pattern for line-item mode, if the category has line items.
    pub line_item_pattern: Option<&'static Regex>,
    pub binarization: Binarization,
    pub layout: PageLayout,
    pub zero_match: ZeroMatchPolicy,
}

impl CategorySchema {
    /// Schema for `category`.
    pub fn for_category(category: DocumentCategory) -> &'static CategorySchema {
        match category {
            DocumentCategory::Invoice => &invoice::SCHEMA,
            DocumentCategory::Payslip => &payslip::SCHEMA,
            DocumentCategory::ProfitLoss => &profit_loss::SCHEMA,
        }
    }

    /// Declared field names, in order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Names of fields marked required.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(|f| f.required).map(|f| f.name)
    }

    pub fn has_line_items(&self) -> bool {
        self.line_item_pattern.is_some()
    }

    /// Serializable summary for display.
    pub fn describe(&self) -> SchemaDescription {
        SchemaDescription {
            category: self.category,
            binarization: self.binarization,
            layout: self.layout,
            zero_match: self.zero_match,
            line_items: self.has_line_items(),
            fields: self
                .fields
                .iter()
                .map(|f| FieldDescription {
                    name: f.name,
                    kind: f.kind,
                    required: f.required,
                })
                .collect(),
        }
    }
}

impl DocumentCategory {
    /// Shorthand for [`CategorySchema::for_category`].
    pub fn schema(self) -> &'static CategorySchema {
        CategorySchema::for_category(self)
    }
}

/// Display form of a [`CategorySchema`].
#[derive(Debug, Clone, Serialize)]
pub struct SchemaDescription {
    pub category: DocumentCategory,
    pub binarization: Binarization,
    pub layout: PageLayout,
    pub zero_match: ZeroMatchPolicy,
    pub line_items: bool,
    pub fields: Vec<FieldDescription>,
}

/// Display form of a [`FieldRule`].
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescription {
    pub name: &'static str,
    pub kind: ValueKind,
    pub required: bool,
}
