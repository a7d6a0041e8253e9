//! Payslip schema.

use lazy_static::lazy_static;

use crate::extract::rules::{FieldRule, ValueKind, AMOUNT, GAP, SEP};
use crate::models::document::DocumentCategory;
use crate::ocr::{Binarization, PageLayout};

use super::{CategorySchema, ZeroMatchPolicy};

/// Current-period amount; the same label prefixed with `YTD` is skipped.
fn current(name: &'static str, label: &str) -> FieldRule {
    FieldRule::new(
        name,
        &format!(r"(?P<skip>YTD[ \t]+)?\b{}{}(?P<value>{})", label, GAP, AMOUNT),
        ValueKind::Decimal,
    )
    .unwrap()
}

/// Year-to-date amount.
fn year_to_date(name: &'static str, label: &str) -> FieldRule {
    FieldRule::new(
        name,
        &format!(r"\bYTD[ \t]+{}{}(?P<value>{})", label, GAP, AMOUNT),
        ValueKind::Decimal,
    )
    .unwrap()
}

fn text(name: &'static str, pattern: &str) -> FieldRule {
    FieldRule::new(name, pattern, ValueKind::Text).unwrap()
}

lazy_static! {
    pub(super) static ref SCHEMA: CategorySchema = CategorySchema {
        category: DocumentCategory::Payslip,
        fields: vec![
            text(
                "Employee Name",
                &format!(r"EMPLOYEE[ \t]+NAME{}(?P<value>[A-Z][A-Z .'\-]*[A-Z.])", SEP),
            ),
            text("Employee ID", &format!(r"EMPLOYEE[ \t]+(?:ID|NO\.?|NUMBER){}(?P<value>\d+)", SEP)),
            text("Check No", &format!(r"CHECK[ \t]+(?:NO\.?|NUMBER|#){}(?P<value>\d+)", SEP)),
            text(
                "Pay Period",
                &format!(r"PAY[ \t]+PERIOD{}(?P<value>\d[\d/\-]*(?:[ \t]*(?:-|to)[ \t]*\d[\d/\-]*)?)", SEP),
            ),
            text("Pay Date", &format!(r"PAY[ \t]+DATE{}(?P<value>\d[\d/\-]*)", SEP)),
            current("Gross Wages", r"GROSS[ \t]+(?:WAGES|PAY)"),
            current("Net Pay", r"NET[ \t]+PAY"),
            current("FICA MED Tax", r"FICA[ \t]+MED(?:ICARE)?[ \t]+TAX"),
            current("FICA SS Tax", r"FICA[ \t]+(?:SS|SOCIAL[ \t]+SECURITY)[ \t]+TAX"),
            current("Federal Tax", r"FED(?:ERAL)?[ \t]+(?:INCOME[ \t]+)?TAX"),
            year_to_date("YTD Gross", r"GROSS(?:[ \t]+(?:WAGES|PAY))?"),
            year_to_date("YTD Deductions", r"DEDUCTIONS"),
            year_to_date("YTD Net Pay", r"NET[ \t]+PAY"),
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
EMPLOYEE NAME John A. Smith
EMPLOYEE ID 004512
CHECK NO. 10233
PAY PERIOD 01/01/2024 - 01/15/2024
PAY DATE 01/19/2024
GROSS WAGES 2,500.00
FICA MED TAX 36.25
FICA SS TAX 155.00
FED TAX 310.40
NET PAY 1,998.35
YTD GROSS 5,000.00
YTD DEDUCTIONS 1,003.30
YTD NET PAY 3,996.70
";

    fn dec(s: &str) -> Option<FieldValue> {
        Some(FieldValue::Decimal(s.parse().unwrap()))
    }

    fn text(s: &str) -> Option<FieldValue> {
        Some(FieldValue::Text(s.to_string()))
    }

    #[test]
    fn test_sample_payslip_fields() {
        let fields = FieldParser::new().extract_fields(SAMPLE, &SCHEMA.fields);

        assert_eq!(fields.get("Employee Name").cloned(), text("John A. Smith"));
        assert_eq!(fields.get("Employee ID").cloned(), text("004512"));
        assert_eq!(fields.get("Check No").cloned(), text("10233"));
        assert_eq!(fields.get("Pay Period").cloned(), text("01/01/2024 - 01/15/2024"));
        assert_eq!(fields.get("Pay Date").cloned(), text("01/19/2024"));
        assert_eq!(fields.get("Gross Wages").cloned(), dec("2500.00"));
        assert_eq!(fields.get("FICA MED Tax").cloned(), dec("36.25"));
        assert_eq!(fields.get("FICA SS Tax").cloned(), dec("155.00"));
        assert_eq!(fields.get("Federal Tax").cloned(), dec("310.40"));
        assert_eq!(fields.get("Net Pay").cloned(), dec("1998.35"));
        assert_eq!(fields.get("YTD Gross").cloned(), dec("5000.00"));
        assert_eq!(fields.get("YTD Deductions").cloned(), dec("1003.30"));
        assert_eq!(fields.get("YTD Net Pay").cloned(), dec("3996.70"));
        assert!(fields.warnings.is_empty());
    }

    #[test]
    fn test_ytd_before_current() {
        let fields = FieldParser::new().extract_fields("YTD NET PAY 9,000.00\nNET PAY 1,500.00", &SCHEMA.fields);
        assert_eq!(fields.get("Net Pay").cloned(), dec("1500.00"));
        assert_eq!(fields.get("YTD Net Pay").cloned(), dec("9000.00"));
    }

    #[test]
    fn test_value_on_next_line() {
        let fields = FieldParser::new().extract_fields("GROSS WAGES\n2,500.00", &SCHEMA.fields);
        assert_eq!(fields.get("Gross Wages").cloned(), dec("2500.00"));
    }
}
