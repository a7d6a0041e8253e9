//! Profit-and-loss statement schema. Values are whole currency units;
//! parenthesized figures are negative.

use lazy_static::lazy_static;

use crate::extract::rules::{FieldRule, ValueKind, AMOUNT, GAP};
use crate::models::document::DocumentCategory;
use crate::ocr::{Binarization, PageLayout};

use super::{CategorySchema, ZeroMatchPolicy};

fn line(name: &'static str, label: &str) -> FieldRule {
    FieldRule::new(
        name,
        &format!(r"{}{}(?P<value>{})", label, GAP, AMOUNT),
        ValueKind::Integer,
    )
    .unwrap()
}

lazy_static! {
    pub(super) static ref SCHEMA: CategorySchema = CategorySchema {
        category: DocumentCategory::ProfitLoss,
        fields: vec![
            line("Revenue", r"^[ \t]*(?:Revenue|Turnover|Sales)"),
            line("Cost of Sales", r"\bCost[ \t]+of[ \t]+(?:sales|goods[ \t]+sold)"),
            line("Gross Profit", r"\bGross[ \t]+profit"),
            line("Dividends Received", r"\bDividends[ \t]+received"),
            line("Profit on Sale of Machine", r"\bProfit[ \t]+on[ \t]+(?:the[ \t]+)?sale[ \t]+of[ \t]+(?:a[ \t]+)?machine"),
            line("Depreciation", r"\bDepreciation"),
            line("Interest Expense", r"\bInterest[ \t]+(?:expense|paid|payable)"),
            line(
                "Distribution and Admin Expenses",
                r"\bDistribution,?[ \t]+administration[ \t]+and[ \t]+other[ \t]+expenses",
            ),
            line("Profit Before Taxation", r"\bProfit[ \t]+before[ \t]+tax(?:ation)?"),
            // Bare "Taxation" line, not the tail of a profit line
            line("Taxation", r"(?P<skip>(?:before|after)[ \t]+)?\bTaxation"),
            line(
                "Net Profit",
                r"\bProfit[ \t]+for[ \t]+the[ \t]+(?:year|period)(?:[ \t]+after[ \t]+tax(?:ation)?)?",
            ),
        ],
        line_item_pattern: None,
        binarization: Binarization::Adaptive,
        layout: PageLayout::Auto,
        zero_match: ZeroMatchPolicy::AllAbsent,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::FieldParser;
    use crate::models::document::FieldValue;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
Statement of profit or loss for the year ended 31 December 2023
Revenue 1,250,000
Cost of sales (700,000)
Gross profit 550,000
Dividends received 12,000
Profit on sale of machine 8,000
Depreciation (45,000)
Interest expense (15,500)
Distribution, administration and other expenses (210,000)
Profit before taxation 299,500
Taxation (74,875)
Profit for the year after taxation 224,625
";

    fn int(v: i64) -> Option<FieldValue> {
        Some(FieldValue::Integer(v))
    }

    #[test]
    fn test_sample_statement() {
        let fields = FieldParser::new().extract_fields(SAMPLE, &SCHEMA.fields);

        assert_eq!(fields.get("Revenue").cloned(), int(1_250_000));
        assert_eq!(fields.get("Cost of Sales").cloned(), int(-700_000));
        assert_eq!(fields.get("Gross Profit").cloned(), int(550_000));
        assert_eq!(fields.get("Dividends Received").cloned(), int(12_000));
        assert_eq!(fields.get("Profit on Sale of Machine").cloned(), int(8_000));
        assert_eq!(fields.get("Depreciation").cloned(), int(-45_000));
        assert_eq!(fields.get("Interest Expense").cloned(), int(-15_500));
        assert_eq!(fields.get("Distribution and Admin Expenses").cloned(), int(-210_000));
        assert_eq!(fields.get("Profit Before Taxation").cloned(), int(299_500));
        assert_eq!(fields.get("Taxation").cloned(), int(-74_875));
        assert_eq!(fields.get("Net Profit").cloned(), int(224_625));
    }

    #[test]
    fn test_taxation_skips_profit_lines() {
        let text = "Profit before taxation 100\nProfit for the year after taxation 80";
        let fields = FieldParser::new().extract_fields(text, &SCHEMA.fields);
        assert_eq!(fields.get("Taxation"), None);
        assert!(fields.contains("Taxation"));
        assert_eq!(fields.get("Net Profit").cloned(), int(80));
    }

    #[test]
    fn test_fractional_value_rejected() {
        let fields = FieldParser::new().extract_fields("Depreciation 12.50", &SCHEMA.fields);
        assert_eq!(fields.get("Depreciation"), None);
        assert_eq!(fields.warnings.len(), 1);
    }
}
