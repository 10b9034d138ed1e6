use crate::error::OcrError;
use image::DynamicImage;

/// Trait that all recognition engines must implement.
///
/// The engine is a black box: image in, raw text out. An empty string is a
/// legitimate result (no text found), not an error; engine-level failures
/// surface as `RecognizerUnavailable`.
pub trait Recognizer: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs", "tesseract")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize text in an image. `language` is an ISO 639-2 code such as
    /// "eng"; engines without language support may ignore it.
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, OcrError>;

    /// Get supported languages
    fn supported_languages(&self) -> Vec<String>;
}
