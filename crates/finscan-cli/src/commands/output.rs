//! Report rendering shared by `process` and `batch`.

use serde::Serialize;

use finscan_core::{ExtractionReport, PipelineFailure, FIELD_HEADERS, LINE_ITEM_HEADERS};

/// Output format for extraction results.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV tables
    Csv,
    /// XML document
    Xml,
    /// Plain text tables
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Xml => "xml",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn format_report(
    report: &ExtractionReport,
    format: OutputFormat,
    show_text: bool,
) -> anyhow::Result<String> {
    let mut output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Csv => format_csv(report)?,
        OutputFormat::Xml => format_xml(report)?,
        OutputFormat::Text => format_text(report),
    };

    if show_text && !matches!(format, OutputFormat::Json | OutputFormat::Xml) {
        output.push_str("\n--- recognized text ---\n");
        output.push_str(&report.recognized_text);
        output.push('\n');
    }

    Ok(output)
}

/// Field table, then the line-item table after a blank line when present.
fn format_csv(report: &ExtractionReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(FIELD_HEADERS)?;
    for row in &report.fields {
        wtr.write_record(row.cells())?;
    }
    let mut data = String::from_utf8(wtr.into_inner()?)?;

    if !report.line_items.is_empty() {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(LINE_ITEM_HEADERS)?;
        for row in &report.line_items {
            wtr.write_record(row.cells())?;
        }
        data.push('\n');
        data.push_str(&String::from_utf8(wtr.into_inner()?)?);
    }

    Ok(data)
}

#[derive(Serialize)]
#[serde(rename = "extraction")]
struct XmlReport<'a> {
    #[serde(rename = "@category")]
    category: &'a str,
    #[serde(rename = "@processed_at")]
    processed_at: String,
    #[serde(rename = "field")]
    fields: Vec<XmlField<'a>>,
    #[serde(rename = "line_item")]
    line_items: Vec<XmlLineItem<'a>>,
    #[serde(rename = "warning")]
    warnings: Vec<&'a str>,
}

#[derive(Serialize)]
struct XmlField<'a> {
    #[serde(rename = "@name")]
    name: &'a str,
    #[serde(rename = "$text")]
    value: String,
}

#[derive(Serialize)]
struct XmlLineItem<'a> {
    description: &'a str,
    rate: String,
    quantity: String,
    line_total: String,
}

fn format_xml(report: &ExtractionReport) -> anyhow::Result<String> {
    let doc = XmlReport {
        category: report.category.as_str(),
        processed_at: report.processed_at.to_rfc3339(),
        fields: report
            .fields
            .iter()
            .map(|row| XmlField {
                name: &row.field,
                value: row.value.as_ref().map(ToString::to_string).unwrap_or_default(),
            })
            .collect(),
        line_items: report
            .line_items
            .iter()
            .map(|row| XmlLineItem {
                description: &row.description,
                rate: row.rate.to_string(),
                quantity: row.quantity.to_string(),
                line_total: row.line_total.to_string(),
            })
            .collect(),
        warnings: report.warnings.iter().map(String::as_str).collect(),
    };

    Ok(quick_xml::se::to_string(&doc)?)
}

fn format_text(report: &ExtractionReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n\n", report.category.title()));

    let field_rows: Vec<Vec<String>> = report.fields.iter().map(|r| r.cells().to_vec()).collect();
    output.push_str(&render_table(&FIELD_HEADERS, &field_rows));

    if !report.line_items.is_empty() {
        output.push('\n');
        let item_rows: Vec<Vec<String>> =
            report.line_items.iter().map(|r| r.cells().to_vec()).collect();
        output.push_str(&render_table(&LINE_ITEM_HEADERS, &item_rows));
    }

    if !report.warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in &report.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    output
}

/// Left-aligned columns padded to the widest cell.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut out = line(headers.to_vec());
    out.push_str(&line(rule.iter().map(String::as_str).collect()));
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}

/// One-line description of a failure for the terminal.
pub fn describe_failure(failure: &PipelineFailure) -> String {
    format!("failed at {}: {}", failure.stage, failure.reason())
}
