//! Data models shared across the pipeline.

pub mod config;
pub mod document;

pub use config::{EngineKind, ExtractionConfig, FinscanConfig, OcrConfig, PreprocessingConfig};
pub use document::{DocumentCategory, ExtractedFields, FieldValue, LineItemRecord};
