//! Tesseract engine implementation
//!
//! Statically linked Tesseract backend with per-request language support.
//! Downloads tessdata (training data) automatically on first use.

use crate::config::Config;
use crate::error::OcrError;
use crate::recognizer::Recognizer;
use image::DynamicImage;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tesseract_static::tesseract::Tesseract;

/// Tesseract-backed recognizer
pub struct TesseractRecognizer {
    /// Path to tessdata directory
    tessdata_path: String,
    /// Language used when a request does not specify one
    default_language: String,
}

impl TesseractRecognizer {
    /// Create a new Tesseract-based recognizer
    pub fn new(config: &Config) -> Result<Self, OcrError> {
        let default_language = config.default_language.clone();

        let tessdata_path = match &config.tessdata_path {
            Some(path) => path.clone(),
            None => ensure_tessdata_available(&default_language)?,
        };

        // Validate that tessdata is accessible by doing a test initialization
        let test_tess =
            Tesseract::new(Some(&tessdata_path), Some(&default_language)).map_err(|e| {
                OcrError::RecognizerUnavailable(format!("Failed to initialize Tesseract: {}", e))
            })?;
        drop(test_tess);

        tracing::info!(
            "Tesseract engine initialized (tessdata: {}, language: {})",
            tessdata_path,
            default_language
        );

        Ok(Self {
            tessdata_path,
            default_language,
        })
    }
}

impl Recognizer for TesseractRecognizer {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn description(&self) -> &'static str {
        "Tesseract OCR engine - broad language coverage, good on handwriting"
    }

    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, OcrError> {
        let language = if language.is_empty() {
            &self.default_language
        } else {
            language
        };

        if language != self.default_language {
            // Training data for non-default languages is fetched lazily
            ensure_tessdata_available(language)?;
        }

        // Convert to BMP in memory (BMP is always supported by leptonica)
        let rgb_img = image.to_rgb8();
        let mut bmp_data = Vec::new();
        {
            let mut cursor = std::io::Cursor::new(&mut bmp_data);
            rgb_img
                .write_to(&mut cursor, image::ImageFormat::Bmp)
                .map_err(|e| {
                    OcrError::RecognizerUnavailable(format!("Failed to convert to BMP: {}", e))
                })?;
        }

        let mut tess = Tesseract::new(Some(&self.tessdata_path), Some(language)).map_err(|e| {
            OcrError::RecognizerUnavailable(format!("Failed to create Tesseract: {}", e))
        })?;

        tess = tess.set_image_from_mem(&bmp_data).map_err(|e| {
            OcrError::RecognizerUnavailable(format!("Failed to set image: {}", e))
        })?;

        tess = tess.recognize().map_err(|e| {
            OcrError::RecognizerUnavailable(format!("Failed to recognize text: {}", e))
        })?;

        let text = tess.get_text().map_err(|e| {
            OcrError::RecognizerUnavailable(format!("Failed to get text: {}", e))
        })?;

        Ok(text)
    }

    fn supported_languages(&self) -> Vec<String> {
        // Tesseract supports many languages; these are the common ones.
        // Additional codes work once their training data is downloadable.
        vec![
            "eng".to_string(),
            "deu".to_string(),
            "fra".to_string(),
            "spa".to_string(),
            "ita".to_string(),
            "por".to_string(),
            "nld".to_string(),
            "jpn".to_string(),
            "chi_sim".to_string(),
            "chi_tra".to_string(),
            "kor".to_string(),
            "ara".to_string(),
            "rus".to_string(),
        ]
    }
}

/// Ensure tessdata for a language is cached locally, returning the directory
fn ensure_tessdata_available(language: &str) -> Result<String, OcrError> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("papyrus-ocr")
        .join("tessdata");

    std::fs::create_dir_all(&cache_dir).map_err(|e| {
        OcrError::RecognizerUnavailable(format!("Failed to create tessdata directory: {}", e))
    })?;

    let traineddata_file = format!("{}.traineddata", language);
    let traineddata_path = cache_dir.join(&traineddata_file);

    if !traineddata_path.exists() {
        let url = tessdata_url(language);
        tracing::info!(
            "Downloading tessdata for '{}' (this may take a moment)...",
            language
        );
        download_file(&url, &traineddata_path)?;
        tracing::info!("Downloaded tessdata to {:?}", traineddata_path);
    } else {
        tracing::info!("Using cached tessdata from {:?}", cache_dir);
    }

    Ok(cache_dir.to_string_lossy().to_string())
}

fn tessdata_url(language: &str) -> String {
    // Use tessdata_fast for smaller, faster downloads
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    )
}

/// Download a file from URL to path using ureq
fn download_file(url: &str, path: &Path) -> Result<(), OcrError> {
    let response = ureq::get(url).call().map_err(|e| {
        OcrError::RecognizerUnavailable(format!("Failed to download tessdata: {}", e))
    })?;

    let mut file = File::create(path).map_err(|e| {
        OcrError::RecognizerUnavailable(format!("Failed to create tessdata file: {}", e))
    })?;

    let buffer = response.into_body().read_to_vec().map_err(|e| {
        OcrError::RecognizerUnavailable(format!("Failed to read response body: {}", e))
    })?;

    file.write_all(&buffer).map_err(|e| {
        OcrError::RecognizerUnavailable(format!("Failed to write tessdata file: {}", e))
    })?;

    Ok(())
}
