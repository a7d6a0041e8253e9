//! Image preprocessing for OCR: decoding, binarization and denoising.

use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OcrError;
use crate::models::config::{PreprocessingConfig, MAX_WINDOW};

/// Binarization method applied to the grayscale image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binarization {
    /// One global threshold chosen automatically from the histogram.
    Otsu,
    /// Per-pixel threshold from the neighborhood mean.
    Adaptive,
}

impl std::fmt::Display for Binarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Binarization::Otsu => write!(f, "otsu"),
            Binarization::Adaptive => write!(f, "adaptive"),
        }
    }
}

/// A decoded upload, before preprocessing.
pub struct RawImage {
    image: DynamicImage,
}

impl RawImage {
    /// Decode PNG/JPEG (or any format `image` supports) from bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, OcrError> {
        if bytes.is_empty() {
            return Err(OcrError::InvalidImage("empty input".to_string()));
        }

        let image = image::load_from_memory(bytes)
            .map_err(|e| OcrError::InvalidImage(format!("failed to decode image: {}", e)))?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!(
                "zero-sized image: {}x{}",
                width, height
            )));
        }

        Ok(Self { image })
    }

    /// Wrap an already decoded image.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!(
                "zero-sized image: {}x{}",
                width, height
            )));
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// A single-channel image whose pixels are either 0 or 255.
#[derive(Debug, Clone)]
pub struct PreprocessedImage {
    image: GrayImage,
    method: Binarization,
}

impl PreprocessedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Method that produced this image.
    pub fn method(&self) -> Binarization {
        self.method
    }

    /// Raw row-major pixel bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Borrow the underlying buffer.
    pub fn as_gray(&self) -> &GrayImage {
        &self.image
    }

    /// Copy into a `DynamicImage` for engines that want one.
    pub fn to_dynamic(&self) -> DynamicImage {
        DynamicImage::ImageLuma8(self.image.clone())
    }
}

/// Image preprocessor for the extraction pipeline.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    /// Median filter window.
    denoise_kernel: u32,
    /// Adaptive threshold neighborhood.
    block_size: u32,
    /// Adaptive threshold offset.
    offset: i32,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self::from_config(&PreprocessingConfig::default())
    }

    /// Create a preprocessor from configuration.
    pub fn from_config(config: &PreprocessingConfig) -> Self {
        Self {
            denoise_kernel: config.denoise_kernel.clamp(1, MAX_WINDOW),
            block_size: config.adaptive_block_size.clamp(3, MAX_WINDOW),
            offset: config.adaptive_offset,
        }
    }

    /// Set the median filter window (1 disables denoising).
    pub fn with_denoise_kernel(mut self, kernel: u32) -> Self {
        self.denoise_kernel = kernel.clamp(1, MAX_WINDOW);
        self
    }

    /// Grayscale, binarize with `method`, then median-filter.
    pub fn process(&self, raw: &RawImage, method: Binarization) -> PreprocessedImage {
        let gray = raw.image.to_luma8();
        debug!(
            "Preprocessing {}x{} image with {} binarization",
            gray.width(),
            gray.height(),
            method
        );

        let binary = match method {
            Binarization::Otsu => {
                let level = otsu_level(&gray);
                debug!("Otsu threshold level: {}", level);
                threshold(&gray, level)
            }
            Binarization::Adaptive => adaptive_threshold(&gray, self.block_size, self.offset),
        };

        let image = if self.denoise_kernel > 1 {
            median_filter(&binary, self.denoise_kernel / 2)
        } else {
            binary
        };

        PreprocessedImage { image, method }
    }

    /// Decode and process in one step.
    pub fn process_bytes(
        &self,
        bytes: &[u8],
        method: Binarization,
    ) -> Result<PreprocessedImage, OcrError> {
        let raw = RawImage::decode(bytes)?;
        Ok(self.process(&raw, method))
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the level maximizing between-class variance (Otsu's method).
///
/// Maximizing between-class variance is equivalent to minimizing the
/// weighted intra-class variance. Ties resolve to the lowest level.
pub fn otsu_level(image: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }

    let sum_all: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut best_level = 0u8;
    let mut best_variance = -1.0f64;
    let mut weight_bg = 0u64;
    let mut sum_bg = 0.0f64;

    for level in 0..256usize {
        weight_bg += histogram[level];
        if weight_bg == 0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0 {
            break;
        }

        sum_bg += level as f64 * histogram[level] as f64;
        let mean_bg = sum_bg / weight_bg as f64;
        let mean_fg = (sum_all - sum_bg) / weight_fg as f64;
        let diff = mean_bg - mean_fg;
        let variance = weight_bg as f64 * weight_fg as f64 * diff * diff;

        if variance > best_variance {
            best_variance = variance;
            best_level = level as u8;
        }
    }

    best_level
}

/// Global threshold: pixels above `level` become white.
fn threshold(image: &GrayImage, level: u8) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut result = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        let output = if pixel[0] > level { 255 } else { 0 };
        result.put_pixel(x, y, Luma([output]));
    }

    result
}

/// Local mean threshold over a `block_size` window, using a summed-area table.
fn adaptive_threshold(image: &GrayImage, block_size: u32, c: i32) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut result = GrayImage::new(width, height);
    let half_block = block_size / 2;

    // integral[(y + 1) * stride + (x + 1)] = sum of pixels in [0..=x] x [0..=y]
    let stride = width as usize + 1;
    let mut integral = vec![0u64; stride * (height as usize + 1)];
    for y in 0..height as usize {
        let mut row_sum = 0u64;
        for x in 0..width as usize {
            row_sum += image.get_pixel(x as u32, y as u32)[0] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }

    for y in 0..height {
        for x in 0..width {
            let y_start = y.saturating_sub(half_block) as usize;
            let y_end = (y + half_block + 1).min(height) as usize;
            let x_start = x.saturating_sub(half_block) as usize;
            let x_end = (x + half_block + 1).min(width) as usize;

            let sum = integral[y_end * stride + x_end] + integral[y_start * stride + x_start]
                - integral[y_start * stride + x_end]
                - integral[y_end * stride + x_start];
            let count = ((y_end - y_start) * (x_end - x_start)) as u64;

            let mean = (sum / count) as i32;
            let threshold = mean - c;
            let pixel_value = image.get_pixel(x, y)[0] as i32;

            let output = if pixel_value > threshold { 255 } else { 0 };
            result.put_pixel(x, y, Luma([output]));
        }
    }

    result
}

/// Median filter with replicated borders.
fn median_filter(image: &GrayImage, radius: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut result = GrayImage::new(width, height);
    let side = (2 * radius + 1) as usize;
    let mut window = Vec::with_capacity(side * side);
    let r = radius as i64;

    for y in 0..height {
        for x in 0..width {
            window.clear();
            for dy in -r..=r {
                let sy = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
                for dx in -r..=r {
                    let sx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
                    window.push(image.get_pixel(sx, sy)[0]);
                }
            }
            window.sort_unstable();
            result.put_pixel(x, y, Luma([window[window.len() / 2]]));
        }
    }

    result
}
