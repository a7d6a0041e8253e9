//! Error types for the finscan-core library.

use thiserror::Error;

/// Main error type for the finscan library.
#[derive(Error, Debug)]
pub enum FinscanError {
    /// Image decoding or text recognition error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while decoding an image or running the text recognizer.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Undecodable bytes, zero dimensions or an unsupported pixel layout.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The recognition engine could not be started.
    #[error("recognition engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The recognition engine ran but reported a failure.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Failed to stage the image for an external engine.
    #[error("failed to stage image: {0}")]
    Staging(#[from] std::io::Error),
}

/// Errors related to structured field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The recognizer returned no text.
    #[error("recognizer returned no text")]
    RecognitionEmpty,

    /// Nothing in the text matched the category schema.
    #[error("no structured data found for {0}")]
    NoStructuredData(String),

    /// A field marked required had no match.
    #[error("missing required field: {0}")]
    MissingRequiredField(String),
}

/// Result type for the finscan library.
pub type Result<T> = std::result::Result<T, FinscanError>;
