//! Core library for financial document field extraction.
//!
//! This crate provides:
//! - Image preprocessing (grayscale, Otsu or adaptive binarization, median denoise)
//! - A text recognition seam with tesseract and in-process ONNX adapters
//! - Regex field schemas for invoices, payslips and profit-and-loss statements
//! - Tabular normalization of extracted fields and invoice line items
//! - A category-agnostic pipeline reporting typed, stage-tagged failures

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod schema;
pub mod tabular;

pub use error::{ExtractionError, FinscanError, OcrError, Result};
pub use extract::{FieldParser, FieldRule, ValueKind};
pub use models::{
    DocumentCategory, EngineKind, ExtractedFields, FieldValue, FinscanConfig, LineItemRecord,
};
pub use ocr::{
    create_recognizer, Binarization, ImagePreprocessor, PageLayout, PreprocessedImage, RawImage,
    RecognizedText, StaticRecognizer, TesseractRecognizer, TextRecognizer,
};
#[cfg(feature = "native")]
pub use ocr::PureOcrRecognizer;
pub use pipeline::{ExtractionReport, FailureKind, Pipeline, PipelineFailure, Stage, StageTiming};
pub use schema::{CategorySchema, ZeroMatchPolicy};
pub use tabular::{FieldRow, LineItemRow, FIELD_HEADERS, LINE_ITEM_HEADERS};
