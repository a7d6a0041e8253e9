//! Image preprocessing and the text recognition seam.
//!
//! The recognizer itself is an external collaborator. This module defines the
//! [`TextRecognizer`] trait the pipeline calls, plus adapters for the
//! tesseract executable, in-process ONNX models and a fixed-text stub.

mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;
mod tesseract;

pub use preprocessing::{otsu_level, Binarization, ImagePreprocessor, PreprocessedImage, RawImage};
#[cfg(feature = "native")]
pub use pure_engine::PureOcrRecognizer;
pub use tesseract::TesseractRecognizer;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use crate::models::config::{EngineKind, OcrConfig};

/// Page segmentation hint passed to the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageLayout {
    /// Let the engine segment the page.
    Auto,
    /// Treat the page as one uniform block of text.
    SingleBlock,
}

/// Whether the recognizer produced any text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionStatus {
    Recognized,
    Empty,
}

/// Text returned by a recognizer. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedText {
    text: String,
    status: RecognitionStatus,
}

impl RecognizedText {
    /// Wrap recognizer output; whitespace-only text counts as empty.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let status = if text.trim().is_empty() {
            RecognitionStatus::Empty
        } else {
            RecognitionStatus::Recognized
        };
        Self { text, status }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> RecognitionStatus {
        self.status
    }

    pub fn is_empty(&self) -> bool {
        self.status == RecognitionStatus::Empty
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Converts a preprocessed image into text.
///
/// Implementations must be callable from several pipeline runs at once.
pub trait TextRecognizer: Send + Sync {
    /// Engine identifier for logs and reports.
    fn name(&self) -> &'static str;

    /// Recognize text in `image`.
    ///
    /// An image without text yields an empty [`RecognizedText`]; errors are
    /// reserved for engine faults.
    fn recognize(
        &self,
        image: &PreprocessedImage,
        layout: PageLayout,
    ) -> Result<RecognizedText, OcrError>;
}

/// Recognizer that ignores the image and returns a fixed text.
///
/// Used to replay previously recognized text and as a deterministic stub.
#[derive(Debug, Clone)]
pub struct StaticRecognizer {
    text: String,
}

impl StaticRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TextRecognizer for StaticRecognizer {
    fn name(&self) -> &'static str {
        "static"
    }

    fn recognize(
        &self,
        _image: &PreprocessedImage,
        _layout: PageLayout,
    ) -> Result<RecognizedText, OcrError> {
        Ok(RecognizedText::new(self.text.clone()))
    }
}

/// Build the recognizer selected in `config`.
pub fn create_recognizer(config: &OcrConfig) -> Result<Arc<dyn TextRecognizer>, OcrError> {
    match config.engine {
        EngineKind::Tesseract => Ok(Arc::new(TesseractRecognizer::new(config.clone()))),
        #[cfg(feature = "native")]
        EngineKind::Onnx => Ok(Arc::new(PureOcrRecognizer::from_dir(&config.model_dir)?)),
        #[cfg(not(feature = "native"))]
        EngineKind::Onnx => Err(OcrError::EngineUnavailable(
            "ONNX engine requires the `native` feature".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_text_status() {
        assert_eq!(RecognizedText::new("Net Pay 100").status(), RecognitionStatus::Recognized);
        assert!(RecognizedText::new("").is_empty());
        assert!(RecognizedText::new("  \n\t ").is_empty());
    }

    #[test]
    fn test_create_tesseract_recognizer() {
        let recognizer = create_recognizer(&OcrConfig::default()).unwrap();
        assert_eq!(recognizer.name(), "tesseract");
    }
}
