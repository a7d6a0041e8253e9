//! Category-agnostic document pipeline.
//!
//! One run takes image bytes and a category, and either produces an
//! [`ExtractionReport`] or stops at the first failing stage with a
//! [`PipelineFailure`]. Stages are never retried.

mod report;
mod stage;

pub use report::{ExtractionReport, FailureKind, PipelineFailure};
pub use stage::{Stage, StageTiming};

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, info_span, warn};

use crate::error::ExtractionError;
use crate::extract::FieldParser;
use crate::models::config::FinscanConfig;
use crate::models::document::{DocumentCategory, ExtractedFields};
use crate::ocr::{ImagePreprocessor, RawImage, TextRecognizer};
use crate::schema::{CategorySchema, ZeroMatchPolicy};
use crate::tabular::{to_field_rows, to_line_item_rows};

/// Runs documents through preprocessing, recognition, extraction and
/// normalization.
///
/// Holds no per-run state, so one pipeline can serve concurrent runs.
pub struct Pipeline {
    recognizer: Arc<dyn TextRecognizer>,
    preprocessor: ImagePreprocessor,
    parser: FieldParser,
    enforce_required: bool,
}

impl Pipeline {
    pub fn new(recognizer: Arc<dyn TextRecognizer>, config: &FinscanConfig) -> Self {
        Self {
            recognizer,
            preprocessor: ImagePreprocessor::from_config(&config.preprocessing),
            parser: FieldParser::new().with_tolerance(config.extraction.line_item_tolerance),
            enforce_required: config.extraction.enforce_required,
        }
    }

    /// Name of the underlying recognizer.
    pub fn recognizer_name(&self) -> &'static str {
        self.recognizer.name()
    }

    /// Process one document.
    pub fn run(
        &self,
        bytes: &[u8],
        category: DocumentCategory,
    ) -> Result<ExtractionReport, PipelineFailure> {
        let schema = category.schema();
        let _run = info_span!("pipeline", category = %category, bytes = bytes.len()).entered();
        let mut timings = Vec::with_capacity(4);

        // Preprocessing
        let start = Instant::now();
        let image = {
            let _span = info_span!("preprocessing", method = %schema.binarization).entered();
            let raw = RawImage::decode(bytes)
                .map_err(|e| PipelineFailure::new(Stage::Preprocessing, e))?;
            self.preprocessor.process(&raw, schema.binarization)
        };
        timings.push(StageTiming::since(Stage::Preprocessing, start));
        debug!("Preprocessed {}x{} image", image.width(), image.height());

        // Recognizing
        let start = Instant::now();
        let recognized = {
            let _span = info_span!("recognizing", engine = self.recognizer.name()).entered();
            self.recognizer
                .recognize(&image, schema.layout)
                .map_err(|e| PipelineFailure::new(Stage::Recognizing, e))?
        };
        timings.push(StageTiming::since(Stage::Recognizing, start));

        if recognized.is_empty() {
            warn!("Recognizer returned no text");
            return Err(PipelineFailure::new(Stage::Recognizing, ExtractionError::RecognitionEmpty)
                .with_text(recognized.into_string()));
        }
        let text = recognized.text();

        // Extracting
        let start = Instant::now();
        let extract_span = info_span!("extracting").entered();
        let mut fields = self.parser.extract_fields(text, &schema.fields);
        let line_items = schema
            .line_item_pattern
            .map(|pattern| self.parser.extract_line_items(text, pattern));

        let nothing_matched = match &line_items {
            Some(items) => items.records.is_empty(),
            None => fields.matched_count() == 0,
        };
        if nothing_matched {
            match schema.zero_match {
                ZeroMatchPolicy::Fail => {
                    return Err(self.extraction_failure(
                        ExtractionError::NoStructuredData(category.title().to_string()),
                        text,
                        &fields,
                        schema,
                    ));
                }
                ZeroMatchPolicy::AllAbsent => {
                    fields.warnings.push("no fields matched".to_string());
                }
            }
        }

        let missing = schema
            .required_fields()
            .find(|name| fields.get(name).is_none());
        if let Some(missing) = missing {
            if self.enforce_required {
                return Err(self.extraction_failure(
                    ExtractionError::MissingRequiredField(missing.to_string()),
                    text,
                    &fields,
                    schema,
                ));
            }
            fields
                .warnings
                .push(format!("missing required field: {}", missing));
        }
        drop(extract_span);
        timings.push(StageTiming::since(Stage::Extracting, start));

        // Normalized
        let start = Instant::now();
        let mut warnings = std::mem::take(&mut fields.warnings);
        let field_rows = to_field_rows(&fields, schema);
        let line_item_rows = match line_items {
            Some(items) => {
                warnings.extend(items.warnings);
                to_line_item_rows(&items.records)
            }
            None => Vec::new(),
        };
        timings.push(StageTiming::since(Stage::Normalized, start));

        info!(
            "Extracted {}/{} fields and {} line items",
            fields.matched_count(),
            field_rows.len(),
            line_item_rows.len()
        );

        Ok(ExtractionReport {
            category,
            fields: field_rows,
            line_items: line_item_rows,
            recognized_text: text.to_string(),
            warnings,
            timings,
            processed_at: Utc::now(),
        })
    }

    fn extraction_failure(
        &self,
        error: ExtractionError,
        text: &str,
        fields: &ExtractedFields,
        schema: &CategorySchema,
    ) -> PipelineFailure {
        warn!("Extraction failed: {}", error);
        PipelineFailure::new(Stage::Extracting, error)
            .with_text(text)
            .with_fields(to_field_rows(fields, schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FinscanError, OcrError};
    use crate::models::document::FieldValue;
    use crate::ocr::{PageLayout, PreprocessedImage, RecognizedText, StaticRecognizer};
    use image::{DynamicImage, GrayImage, ImageFormat, Luma};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn png() -> Vec<u8> {
        let img = GrayImage::from_fn(40, 24, |x, y| {
            if (8..32).contains(&x) && (10..14).contains(&y) {
                Luma([20u8])
            } else {
                Luma([230u8])
            }
        });
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn pipeline(text: &str) -> Pipeline {
        Pipeline::new(Arc::new(StaticRecognizer::new(text)), &FinscanConfig::default())
    }

    /// Counts calls so tests can prove a stage was never reached.
    struct CountingRecognizer(AtomicUsize);

    impl TextRecognizer for CountingRecognizer {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn recognize(
            &self,
            _image: &PreprocessedImage,
            _layout: PageLayout,
        ) -> Result<RecognizedText, OcrError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(RecognizedText::new("Revenue 100"))
        }
    }

    const INVOICE: &str = "\
Invoice #: 1042
Date: 03/01/2024
Description Rate Qty Total
Consulting hours 120.00 10 1,200.00
Travel 35.50 2 71.00
Printing 0.25 400 100.00
Payment due within 30 days
Total: $1,371.00";

    #[test]
    fn test_invalid_image_stops_at_preprocessing() {
        let recognizer = Arc::new(CountingRecognizer(AtomicUsize::new(0)));
        let pipeline = Pipeline::new(recognizer.clone(), &FinscanConfig::default());

        let failure = pipeline.run(b"not an image", DocumentCategory::ProfitLoss).unwrap_err();
        assert_eq!(failure.stage, Stage::Preprocessing);
        assert_eq!(failure.kind(), FailureKind::InvalidImage);
        assert_eq!(recognizer.0.load(Ordering::SeqCst), 0);

        let failure = pipeline.run(&[], DocumentCategory::ProfitLoss).unwrap_err();
        assert_eq!(failure.kind(), FailureKind::InvalidImage);
    }

    #[test]
    fn test_empty_recognition() {
        let failure = pipeline("  \n ").run(&png(), DocumentCategory::Payslip).unwrap_err();
        assert_eq!(failure.stage, Stage::Recognizing);
        assert_eq!(failure.kind(), FailureKind::RecognitionEmpty);
    }

    #[test]
    fn test_invoice_success() {
        let report = pipeline(INVOICE).run(&png(), DocumentCategory::Invoice).unwrap();

        assert_eq!(report.category, DocumentCategory::Invoice);
        assert_eq!(report.fields.len(), DocumentCategory::Invoice.schema().fields.len());
        assert_eq!(report.fields[0].value, Some(FieldValue::Text("1042".to_string())));
        assert_eq!(report.line_items.len(), 3);
        assert_eq!(report.line_items[0].description, "Consulting hours");
        assert_eq!(report.line_items[2].description, "Printing");
        assert_eq!(report.recognized_text, INVOICE);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.timings.len(), 4);
    }

    #[test]
    fn test_invoice_without_line_items_fails() {
        let failure = pipeline("Invoice #: 1042\nTotal: 50.00")
            .run(&png(), DocumentCategory::Invoice)
            .unwrap_err();
        assert_eq!(failure.stage, Stage::Extracting);
        assert_eq!(failure.kind(), FailureKind::NoStructuredData);
        assert_eq!(failure.fields.len(), DocumentCategory::Invoice.schema().fields.len());
        assert!(failure.recognized_text.is_some());
    }

    #[test]
    fn test_missing_invoice_number() {
        let text = "Widget 10.00 2 20.00";
        let failure = pipeline(text).run(&png(), DocumentCategory::Invoice).unwrap_err();
        assert_eq!(failure.kind(), FailureKind::MissingRequiredField);
        assert!(matches!(
            failure.error,
            FinscanError::Extraction(ExtractionError::MissingRequiredField(ref name)) if name == "Invoice Number"
        ));

        let mut config = FinscanConfig::default();
        config.extraction.enforce_required = false;
        let lenient = Pipeline::new(Arc::new(StaticRecognizer::new(text)), &config);
        let report = lenient.run(&png(), DocumentCategory::Invoice).unwrap();
        assert_eq!(report.line_items.len(), 1);
        assert!(report.warnings.iter().any(|w| w.contains("Invoice Number")));
    }

    #[test]
    fn test_payslip_all_absent() {
        let report = pipeline("Thank you for your service")
            .run(&png(), DocumentCategory::Payslip)
            .unwrap();
        assert_eq!(report.fields.len(), DocumentCategory::Payslip.schema().fields.len());
        assert!(report.fields.iter().all(|r| r.value.is_none()));
        assert_eq!(report.matched_fields(), 0);
        assert!(report.line_items.is_empty());
    }

    #[test]
    fn test_profit_loss_negatives() {
        let report = pipeline("Depreciation (1,234)\nTaxation (500)")
            .run(&png(), DocumentCategory::ProfitLoss)
            .unwrap();
        let value = |name: &str| {
            report
                .fields
                .iter()
                .find(|r| r.field == name)
                .and_then(|r| r.value.clone())
        };
        assert_eq!(value("Depreciation"), Some(FieldValue::Integer(-1234)));
        assert_eq!(value("Taxation"), Some(FieldValue::Integer(-500)));
        assert_eq!(value("Revenue"), None);
    }

    #[test]
    fn test_overflowing_item_is_kept_with_warning() {
        let report = pipeline("Invoice #: 1\nWidget 79228162514264337593543950335 2 1.00")
            .run(&png(), DocumentCategory::Invoice)
            .unwrap();
        assert_eq!(report.line_items.len(), 1);
        assert_eq!(report.line_items[0].description, "Widget");
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_report_json_keeps_text_values() {
        let report = pipeline("EMPLOYEE ID 004512\nNET PAY 1,500.00")
            .run(&png(), DocumentCategory::Payslip)
            .unwrap();
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();

        let value = |name: &str| {
            json["fields"]
                .as_array()
                .unwrap()
                .iter()
                .find(|row| row["Field"] == name)
                .map(|row| row["Value"].clone())
                .unwrap()
        };
        assert_eq!(value("Employee ID"), serde_json::json!("004512"));
        assert_eq!(value("Net Pay"), serde_json::json!("1500.00"));
        assert_eq!(value("Check No"), serde_json::Value::Null);
        assert_eq!(json["category"], "payslip");
    }

    #[test]
    fn test_idempotent() {
        let pipeline = pipeline(INVOICE);
        let bytes = png();
        let first = pipeline.run(&bytes, DocumentCategory::Invoice).unwrap();
        let second = pipeline.run(&bytes, DocumentCategory::Invoice).unwrap();
        assert_eq!(first.fields, second.fields);
        assert_eq!(first.line_items, second.line_items);
    }

    #[test]
    fn test_shared_across_threads() {
        let pipeline = Arc::new(pipeline("Revenue 1,000\nGross profit 400"));
        let bytes = Arc::new(png());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pipeline = Arc::clone(&pipeline);
                let bytes = Arc::clone(&bytes);
                std::thread::spawn(move || pipeline.run(&bytes, DocumentCategory::ProfitLoss).map(|r| r.fields))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }
}
