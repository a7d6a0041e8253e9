//! Text recognition through the external `tesseract` executable.

use std::io::{ErrorKind, Write};
use std::process::Command;
use std::time::Instant;

use image::ImageFormat;
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{PageLayout, PreprocessedImage, RecognizedText, TextRecognizer};

/// Runs `tesseract <image> stdout` on a staged copy of the image.
///
/// The image is written to a uniquely named temp file per call, and the file
/// is removed when the call returns, on success or failure.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    config: OcrConfig,
}

impl TesseractRecognizer {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    fn psm(layout: PageLayout) -> &'static str {
        match layout {
            PageLayout::Auto => "3",
            PageLayout::SingleBlock => "6",
        }
    }

    fn stage(&self, image: &PreprocessedImage) -> Result<tempfile::TempPath, OcrError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("finscan-").suffix(".png");

        let mut file = match &self.config.staging_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        image
            .as_gray()
            .write_to(file.as_file_mut(), ImageFormat::Png)
            .map_err(|e| OcrError::Recognition(format!("failed to encode staged image: {}", e)))?;
        file.as_file_mut().flush()?;

        Ok(file.into_temp_path())
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(
        &self,
        image: &PreprocessedImage,
        layout: PageLayout,
    ) -> Result<RecognizedText, OcrError> {
        let start = Instant::now();
        let staged = self.stage(image)?;
        debug!("Staged image at {}", staged.display());

        let output = Command::new(&self.config.tesseract_cmd)
            .arg(&*staged)
            .arg("stdout")
            .arg("--oem")
            .arg(self.config.oem.to_string())
            .arg("--psm")
            .arg(Self::psm(layout))
            .arg("-l")
            .arg(self.config.language_arg())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => OcrError::EngineUnavailable(format!(
                    "{} not found",
                    self.config.tesseract_cmd.display()
                )),
                _ => OcrError::EngineUnavailable(format!(
                    "failed to start {}: {}",
                    self.config.tesseract_cmd.display(),
                    e
                )),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();

        info!(
            "tesseract recognized {} characters in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );

        Ok(RecognizedText::new(text))
    }
}
