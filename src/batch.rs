//! Batch pipeline over a directory of scanned images
//!
//! Writes four artifacts per source image under parallel output
//! directories: the preprocessed image, OCR text from the raw and from the
//! processed image, and the cleaned/structured text. A failing image is
//! logged and skipped; it never aborts the batch.

use crate::error::OcrError;
use crate::preprocessing::{self, Pipeline, PreprocessOptions};
use crate::recognizer::Recognizer;
use crate::text;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extensions recognized as raster scans
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "tif", "bmp"];

const PROCESSED_IMAGES_DIR: &str = "images_processed";
const OCR_RAW_DIR: &str = "ocr_raw";
const OCR_PROCESSED_DIR: &str = "ocr_processed";
const CLEANED_TEXT_DIR: &str = "cleaned_text";

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory of raw scans
    pub input_dir: PathBuf,
    /// Root under which the artifact directories are created
    pub output_dir: PathBuf,
    /// Language code passed to the recognizer
    pub language: String,
    pub preprocess: PreprocessOptions,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
}

/// Run the full pipeline over every image in the input directory
pub fn run(recognizer: Arc<dyn Recognizer>, options: &BatchOptions) -> Result<BatchSummary, OcrError> {
    let dirs = ArtifactDirs::create(&options.output_dir)?;
    let pipeline = Pipeline::new(options.preprocess);

    let entries = fs::read_dir(&options.input_dir).map_err(|e| {
        OcrError::InvalidRequest(format!("{}: {}", options.input_dir.display(), e))
    })?;

    let mut summary = BatchSummary::default();

    for entry in entries {
        let entry = entry.map_err(|e| OcrError::Internal(format!("read_dir: {}", e)))?;
        let path = entry.path();
        if !has_image_extension(&path) {
            continue;
        }

        match process_one(recognizer.as_ref(), &pipeline, options, &dirs, &path) {
            Ok(()) => {
                tracing::info!("Processed {}", path.display());
                summary.processed += 1;
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                summary.skipped += 1;
            }
        }
    }

    tracing::info!(
        "Batch complete: {} processed, {} skipped",
        summary.processed,
        summary.skipped
    );
    Ok(summary)
}

struct ArtifactDirs {
    processed_images: PathBuf,
    ocr_raw: PathBuf,
    ocr_processed: PathBuf,
    cleaned_text: PathBuf,
}

impl ArtifactDirs {
    fn create(root: &Path) -> Result<Self, OcrError> {
        let dirs = Self {
            processed_images: root.join(PROCESSED_IMAGES_DIR),
            ocr_raw: root.join(OCR_RAW_DIR),
            ocr_processed: root.join(OCR_PROCESSED_DIR),
            cleaned_text: root.join(CLEANED_TEXT_DIR),
        };
        for dir in [
            &dirs.processed_images,
            &dirs.ocr_raw,
            &dirs.ocr_processed,
            &dirs.cleaned_text,
        ] {
            fs::create_dir_all(dir)
                .map_err(|e| OcrError::Internal(format!("{}: {}", dir.display(), e)))?;
        }
        Ok(dirs)
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Process a single scan, publishing all four artifacts atomically.
///
/// Both OCR passes always run; cleanup prefers the processed-image text and
/// falls back to the raw-image text when it comes back empty.
fn process_one(
    recognizer: &dyn Recognizer,
    pipeline: &Pipeline,
    options: &BatchOptions,
    dirs: &ArtifactDirs,
    path: &Path,
) -> Result<(), OcrError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| OcrError::InvalidImage(format!("{}: unusable name", path.display())))?;

    let image = preprocessing::load(path)?;
    let preprocessed = pipeline.process(image.clone())?;

    let processed_path = dirs
        .processed_images
        .join(format!("{}_processed.png", stem));
    preprocessing::save_atomic(&preprocessed.image, &processed_path)?;

    let raw_ocr = recognizer.recognize(&image, &options.language)?;
    write_text_atomic(&dirs.ocr_raw.join(format!("{}_ocr_raw.txt", stem)), &raw_ocr)?;

    let processed_ocr = recognizer.recognize(&preprocessed.image, &options.language)?;
    write_text_atomic(
        &dirs.ocr_processed.join(format!("{}_ocr_processed.txt", stem)),
        &processed_ocr,
    )?;

    let text_to_clean = if processed_ocr.trim().is_empty() {
        &raw_ocr
    } else {
        &processed_ocr
    };
    let cleaned = text::clean(text_to_clean);
    write_text_atomic(
        &dirs.cleaned_text.join(format!("{}_cleaned.txt", stem)),
        &cleaned,
    )?;

    Ok(())
}

/// Write text via a same-directory temp file and rename into place
fn write_text_atomic(path: &Path, content: &str) -> Result<(), OcrError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| OcrError::Internal(format!("temp file: {}", e)))?;
    temp.write_all(content.as_bytes())
        .map_err(|e| OcrError::Internal(format!("{}: {}", path.display(), e)))?;
    temp.persist(path)
        .map_err(|e| OcrError::Internal(format!("{}: {}", path.display(), e)))?;

    Ok(())
}
