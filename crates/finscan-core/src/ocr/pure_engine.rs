//! In-process OCR using `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::OcrError;

use super::{PageLayout, PreprocessedImage, RecognizedText, TextRecognizer};

/// Row height used to group detected regions into lines.
const LINE_BUCKET_PX: f64 = 20.0;

/// Recognizer backed by PaddleOCR models loaded through `pure-onnx-ocr`.
pub struct PureOcrRecognizer {
    engine: pure_onnx_ocr::engine::OcrEngine,
}

impl PureOcrRecognizer {
    /// Load `det.onnx`, `latin_rec.onnx` and `latin_dict.txt` from `model_dir`.
    pub fn from_dir(model_dir: &Path) -> Result<Self, OcrError> {
        let det_path = model_dir.join("det.onnx");
        let rec_path = model_dir.join("latin_rec.onnx");
        let dict_path = model_dir.join("latin_dict.txt");

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!("missing {}", path.display())));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self { engine })
    }
}

impl TextRecognizer for PureOcrRecognizer {
    fn name(&self) -> &'static str {
        "pure-onnx-ocr"
    }

    fn recognize(
        &self,
        image: &PreprocessedImage,
        _layout: PageLayout,
    ) -> Result<RecognizedText, OcrError> {
        let start = Instant::now();

        let results = self
            .engine
            .run_from_image(&image.to_dynamic())
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        // (row bucket, x, text) in reading order
        let mut regions: Vec<(i64, f64, String)> = results
            .iter()
            .map(|r| {
                let (x, y) = top_left(&r.bounding_box);
                ((y / LINE_BUCKET_PX) as i64, x, r.text.replace("[UNK]", " "))
            })
            .collect();
        regions.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then(a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        });

        // Regions in the same row bucket share a line.
        let mut lines: Vec<String> = Vec::new();
        let mut current_row = None;
        for (row, _, text) in regions {
            match lines.last_mut() {
                Some(line) if current_row == Some(row) => {
                    line.push(' ');
                    line.push_str(&text);
                }
                _ => {
                    lines.push(text);
                    current_row = Some(row);
                }
            }
        }

        info!(
            "OCR complete: {} lines in {}ms",
            lines.len(),
            start.elapsed().as_millis()
        );

        Ok(RecognizedText::new(lines.join("\n")))
    }
}

/// Smallest x and y over the polygon's exterior.
fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f64, f64) {
    polygon
        .exterior()
        .coords()
        .fold((f64::INFINITY, f64::INFINITY), |(min_x, min_y), c| {
            (min_x.min(c.x), min_y.min(c.y))
        })
}
