//! Image preprocessing module for OCR enhancement
//!
//! Converts an arbitrary raster scan into a skew-corrected, binarized image
//! ready for character recognition.

pub mod steps;

use crate::error::OcrError;
use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

/// Preprocessing configuration, fixed at pipeline construction.
///
/// Skew correction is opt-in: the default path binarizes the denoised
/// grayscale image directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreprocessOptions {
    /// Rotate text lines back to horizontal before binarization
    pub deskew: bool,
}

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingResult {
    /// Preprocessed image (not serialized)
    #[serde(skip)]
    pub image: DynamicImage,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Preprocessing pipeline: grayscale -> denoise -> [deskew] -> binarize
pub struct Pipeline {
    options: PreprocessOptions,
}

impl Pipeline {
    pub fn new(options: PreprocessOptions) -> Self {
        Self { options }
    }

    /// Process an image into its recognition-ready binary form
    pub fn process(&self, image: DynamicImage) -> Result<PreprocessingResult, OcrError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(OcrError::InvalidImage("zero-sized image".to_string()));
        }

        let start = Instant::now();
        let mut steps_timing = Vec::new();

        let mut img = image;
        img = self.run_step("grayscale", img, &mut steps_timing, steps::grayscale::apply)?;
        img = self.run_step("denoise", img, &mut steps_timing, steps::denoise::apply)?;

        if self.options.deskew {
            img = self.run_step("deskew", img, &mut steps_timing, steps::deskew::apply)?;
        }

        img = self.run_step("binarize", img, &mut steps_timing, steps::binarize::apply)?;

        Ok(PreprocessingResult {
            image: img,
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: steps_timing,
        })
    }

    fn run_step<F>(
        &self,
        name: &str,
        img: DynamicImage,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> Result<DynamicImage, OcrError>
    where
        F: FnOnce(DynamicImage) -> Result<DynamicImage, OcrError>,
    {
        let step_start = Instant::now();
        let result = step_fn(img)?;
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms: step_start.elapsed().as_millis() as u64,
        });
        Ok(result)
    }
}

/// Load a raster image from disk
pub fn load(path: &Path) -> Result<DynamicImage, OcrError> {
    let img = image::open(path)
        .map_err(|e| OcrError::InvalidImage(format!("{}: {}", path.display(), e)))?;

    if img.width() == 0 || img.height() == 0 {
        return Err(OcrError::InvalidImage(format!(
            "{}: zero-sized image",
            path.display()
        )));
    }

    Ok(img)
}

/// Save an image, publishing atomically.
///
/// The image is encoded into a temp file in the destination directory and
/// renamed into place, so a failed encode never leaves a partial artifact.
pub fn save_atomic(image: &DynamicImage, path: &Path) -> Result<(), OcrError> {
    let format = ImageFormat::from_path(path)
        .map_err(|e| OcrError::PreprocessingFailed(format!("{}: {}", path.display(), e)))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| OcrError::PreprocessingFailed(format!("temp file: {}", e)))?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        image
            .write_to(&mut writer, format)
            .map_err(|e| OcrError::PreprocessingFailed(format!("{}: {}", path.display(), e)))?;
    }

    temp.persist(path)
        .map_err(|e| OcrError::PreprocessingFailed(format!("{}: {}", path.display(), e)))?;

    Ok(())
}
