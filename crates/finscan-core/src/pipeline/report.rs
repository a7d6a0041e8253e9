//! Pipeline outcomes: the success report and the typed failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ExtractionError, FinscanError, OcrError};
use crate::models::document::DocumentCategory;
use crate::tabular::{FieldRow, LineItemRow};

use super::stage::{Stage, StageTiming};

/// Successful pipeline output.
///
/// Serialize-only: field values are written bare, without their kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionReport {
    pub category: DocumentCategory,
    /// One row per schema field, in declared order.
    pub fields: Vec<FieldRow>,
    /// One row per matched line item; empty for categories without line items.
    pub line_items: Vec<LineItemRow>,
    /// Raw recognizer output, kept for display.
    pub recognized_text: String,
    pub warnings: Vec<String>,
    pub timings: Vec<StageTiming>,
    pub processed_at: DateTime<Utc>,
}

impl ExtractionReport {
    /// Number of fields with a value.
    pub fn matched_fields(&self) -> usize {
        self.fields.iter().filter(|r| r.value.is_some()).count()
    }

    /// Total wall time over all stages.
    pub fn total_ms(&self) -> u64 {
        self.timings.iter().map(|t| t.elapsed_ms).sum()
    }
}

/// Category of a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidImage,
    RecognitionFailed,
    RecognitionEmpty,
    NoStructuredData,
    MissingRequiredField,
}

/// A pipeline run that stopped before `Normalized`.
///
/// Carries whatever the run had produced before it stopped, so callers can
/// still show the recognized text and the (absent) field table.
#[derive(Debug, Error)]
#[error("{stage} failed: {error}")]
pub struct PipelineFailure {
    pub stage: Stage,
    #[source]
    pub error: FinscanError,
    pub recognized_text: Option<String>,
    pub fields: Vec<FieldRow>,
}

impl PipelineFailure {
    pub fn new(stage: Stage, error: impl Into<FinscanError>) -> Self {
        Self {
            stage,
            error: error.into(),
            recognized_text: None,
            fields: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.recognized_text = Some(text.into());
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldRow>) -> Self {
        self.fields = fields;
        self
    }

    pub fn kind(&self) -> FailureKind {
        match &self.error {
            FinscanError::Ocr(OcrError::InvalidImage(_)) => FailureKind::InvalidImage,
            FinscanError::Extraction(ExtractionError::RecognitionEmpty) => FailureKind::RecognitionEmpty,
            FinscanError::Extraction(ExtractionError::NoStructuredData(_)) => {
                FailureKind::NoStructuredData
            }
            FinscanError::Extraction(ExtractionError::MissingRequiredField(_)) => {
                FailureKind::MissingRequiredField
            }
            _ if self.stage == Stage::Preprocessing => FailureKind::InvalidImage,
            _ => FailureKind::RecognitionFailed,
        }
    }

    /// Human-readable reason, without the stage prefix.
    pub fn reason(&self) -> String {
        self.error.to_string()
    }
}
