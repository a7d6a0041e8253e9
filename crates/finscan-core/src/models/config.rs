//! Configuration structures for the extraction pipeline.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{FinscanError, Result};

/// Largest accepted median or adaptive-threshold window.
pub const MAX_WINDOW: u32 = 99;

/// Main configuration for the finscan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FinscanConfig {
    /// Text recognizer configuration.
    pub ocr: OcrConfig,

    /// Image preprocessing configuration.
    pub preprocessing: PreprocessingConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// Which recognition engine backs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// External `tesseract` executable.
    Tesseract,
    /// In-process ONNX models (requires the `native` feature).
    Onnx,
}

/// Text recognizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Recognition engine.
    pub engine: EngineKind,

    /// Path or name of the tesseract executable.
    pub tesseract_cmd: PathBuf,

    /// Tesseract language packs, joined with `+`.
    pub languages: Vec<String>,

    /// Tesseract OCR engine mode (`--oem`).
    pub oem: u8,

    /// Directory for staged images; the system temp dir when unset.
    pub staging_dir: Option<PathBuf>,

    /// Directory containing `det.onnx`, `latin_rec.onnx` and `latin_dict.txt`.
    pub model_dir: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Tesseract,
            tesseract_cmd: PathBuf::from("tesseract"),
            languages: vec!["eng".to_string()],
            oem: 3,
            staging_dir: None,
            model_dir: PathBuf::from("models"),
        }
    }
}

impl OcrConfig {
    /// Language argument in tesseract's `eng+deu` form.
    pub fn language_arg(&self) -> String {
        if self.languages.is_empty() {
            "eng".to_string()
        } else {
            self.languages.join("+")
        }
    }
}

/// Image preprocessing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Median filter window size (odd; 1 disables denoising).
    pub denoise_kernel: u32,

    /// Neighborhood size for adaptive thresholding (odd).
    pub adaptive_block_size: u32,

    /// Constant subtracted from the neighborhood mean.
    pub adaptive_offset: i32,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            denoise_kernel: 3,
            adaptive_block_size: 15,
            adaptive_offset: 5,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Fail the run when a required field is missing; warn otherwise.
    pub enforce_required: bool,

    /// Allowed difference between `rate × quantity` and a printed line total.
    pub line_item_tolerance: Decimal,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            enforce_required: true,
            line_item_tolerance: Decimal::new(1, 2),
        }
    }
}

impl FinscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let p = &self.preprocessing;
        if p.denoise_kernel % 2 == 0 || p.denoise_kernel > MAX_WINDOW {
            return Err(FinscanError::Config(format!(
                "preprocessing.denoise_kernel must be odd and <= {}, got {}",
                MAX_WINDOW, p.denoise_kernel
            )));
        }
        if p.adaptive_block_size < 3
            || p.adaptive_block_size % 2 == 0
            || p.adaptive_block_size > MAX_WINDOW
        {
            return Err(FinscanError::Config(format!(
                "preprocessing.adaptive_block_size must be odd and between 3 and {}, got {}",
                MAX_WINDOW, p.adaptive_block_size
            )));
        }
        if self.extraction.line_item_tolerance.is_sign_negative() {
            return Err(FinscanError::Config(
                "extraction.line_item_tolerance must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
