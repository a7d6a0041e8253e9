//! Invoice schema: header fields plus line items.

use lazy_static::lazy_static;

use crate::extract::rules::{FieldRule, ValueKind, AMOUNT, DATE, LINE_ITEM, SEP};
use crate::models::document::DocumentCategory;
use crate::ocr::{Binarization, PageLayout};

use super::{CategorySchema, ZeroMatchPolicy};

lazy_static! {
    pub(super) static ref SCHEMA: CategorySchema = CategorySchema {
        category: DocumentCategory::Invoice,
        fields: vec![
            // INV-0042, 2024/117; a digit is required so "Invoice Date" is not a number
            FieldRule::new(
                "Invoice Number",
                &format!(r"^[ \t]*Invoice[ \t]*(?:No\.?|Number|#)?{}(?P<value>[A-Z/\-]*\d[A-Z0-9/\-]*)", SEP),
                ValueKind::Text,
            )
            .unwrap()
            .required(),
            FieldRule::new(
                "Date",
                &format!(r"^[ \t]*(?:Invoice[ \t]+)?Date(?:[ \t]+of[ \t]+Issue)?{}(?P<value>{})", SEP, DATE),
                ValueKind::Text,
            )
            .unwrap(),
            FieldRule::new(
                "Due Date",
                &format!(r"^[ \t]*(?:Payment[ \t]+)?Due(?:[ \t]+Date)?{}(?P<value>{})", SEP, DATE),
                ValueKind::Text,
            )
            .unwrap(),
            FieldRule::new(
                "Subtotal",
                &format!(r"^[ \t]*Sub[ \t\-]?total{}(?P<value>{})", SEP, AMOUNT),
                ValueKind::Decimal,
            )
            .unwrap(),
            FieldRule::new(
                "Tax",
                &format!(r"^[ \t]*(?:Sales[ \t]+|VAT[ \t]+)?Tax(?:[ \t]*\([^)\n]*\))?{}(?P<value>{})", SEP, AMOUNT),
                ValueKind::Decimal,
            )
            .unwrap(),
            // Line-anchored so neither "Subtotal" nor a "Line Total" header matches
            FieldRule::new(
                "Total Amount",
                &format!(
                    r"^[ \t]*(?:(?:Grand[ \t]+)?Total(?:[ \t]+(?:Amount|Due))?|Amount[ \t]+Due|Balance[ \t]+Due){}(?P<value>{})",
                    SEP, AMOUNT
                ),
                ValueKind::Decimal,
            )
            .unwrap(),
        ],
        line_item_pattern: Some(&*LINE_ITEM),
        binarization: Binarization::Otsu,
        layout: PageLayout::SingleBlock,
        zero_match: ZeroMatchPolicy::Fail,
    };
}
