//! Full document pipeline: preprocess, recognize, clean

use crate::error::OcrError;
use crate::preprocessing::{self, Pipeline, PreprocessOptions};
use crate::recognizer::Recognizer;
use crate::text;
use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;

/// Which image produced the text that was cleaned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// Recognition ran on the preprocessed image
    Processed,
    /// The processed image yielded no text; the unprocessed source did
    RawFallback,
}

/// Outcome of running one document through the pipeline
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    /// Cleaned, structured text
    pub cleaned_text: String,
    /// Raw recognizer output the cleanup started from
    pub raw_text: String,
    /// Recognition-ready image produced by preprocessing
    pub processed_image: DynamicImage,
    /// Which image the text came from
    pub source: TextSource,
}

/// Per-document pipeline. Each instance owns its inputs exclusively, so
/// independent documents can be processed in parallel without locking.
pub struct DocumentPipeline {
    recognizer: Arc<dyn Recognizer>,
    preprocess: Pipeline,
}

impl DocumentPipeline {
    pub fn new(recognizer: Arc<dyn Recognizer>, options: PreprocessOptions) -> Self {
        Self {
            recognizer,
            preprocess: Pipeline::new(options),
        }
    }

    /// Load a document image from disk and process it
    pub fn process_file(&self, path: &Path, language: &str) -> Result<ProcessedDocument, OcrError> {
        let image = preprocessing::load(path)?;
        self.process_image(image, language)
    }

    /// Preprocess, recognize, and clean a single document image.
    ///
    /// An empty recognition result is not an error: the recognizer is re-run
    /// once on the unprocessed source image. Decode and engine failures are
    /// never retried; the deterministic stages make that pointless.
    pub fn process_image(
        &self,
        image: DynamicImage,
        language: &str,
    ) -> Result<ProcessedDocument, OcrError> {
        let preprocessed = self.preprocess.process(image.clone())?;
        tracing::debug!(
            "preprocessing finished in {}ms ({} steps)",
            preprocessed.total_time_ms,
            preprocessed.steps.len()
        );

        let mut source = TextSource::Processed;
        let mut raw_text = self.recognizer.recognize(&preprocessed.image, language)?;

        if raw_text.trim().is_empty() {
            tracing::warn!("no text recognized on processed image; retrying on source image");
            raw_text = self.recognizer.recognize(&image, language)?;
            source = TextSource::RawFallback;
        }

        let cleaned_text = text::clean(&raw_text);

        Ok(ProcessedDocument {
            cleaned_text,
            raw_text,
            processed_image: preprocessed.image,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Recognizer stub replaying scripted responses
    struct ScriptedRecognizer {
        responses: Mutex<VecDeque<Result<String, String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedRecognizer {
        fn new(responses: Vec<Result<&str, &str>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Recognizer for ScriptedRecognizer {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn description(&self) -> &'static str {
            "test stub"
        }

        fn recognize(&self, _image: &DynamicImage, _language: &str) -> Result<String, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected recognize call")
                .map_err(OcrError::RecognizerUnavailable)
        }

        fn supported_languages(&self) -> Vec<String> {
            vec!["eng".to_string()]
        }
    }

    fn scan() -> DynamicImage {
        let mut img = GrayImage::from_pixel(60, 40, Luma([240]));
        for x in 10..50 {
            img.put_pixel(x, 20, Luma([20]));
        }
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn test_processed_text_is_cleaned_without_fallback() {
        let recognizer = ScriptedRecognizer::new(vec![Ok("hello   world\n\n\n\ngoodbye")]);
        let pipeline = DocumentPipeline::new(recognizer.clone(), PreprocessOptions::default());

        let doc = pipeline.process_image(scan(), "eng").unwrap();

        assert_eq!(doc.cleaned_text, "hello world\n\ngoodbye");
        assert_eq!(doc.source, TextSource::Processed);
        assert_eq!(recognizer.calls(), 1);
    }

    #[test]
    fn test_empty_result_falls_back_to_source_image_once() {
        let recognizer = ScriptedRecognizer::new(vec![Ok(""), Ok("recovered text")]);
        let pipeline = DocumentPipeline::new(recognizer.clone(), PreprocessOptions::default());

        let doc = pipeline.process_image(scan(), "eng").unwrap();

        assert_eq!(doc.cleaned_text, "recovered text");
        assert_eq!(doc.source, TextSource::RawFallback);
        assert_eq!(recognizer.calls(), 2);
    }

    #[test]
    fn test_empty_fallback_result_is_not_an_error() {
        let recognizer = ScriptedRecognizer::new(vec![Ok(""), Ok("")]);
        let pipeline = DocumentPipeline::new(recognizer.clone(), PreprocessOptions::default());

        let doc = pipeline.process_image(scan(), "eng").unwrap();

        assert_eq!(doc.cleaned_text, "");
        assert_eq!(doc.source, TextSource::RawFallback);
        assert_eq!(recognizer.calls(), 2);
    }

    #[test]
    fn test_engine_failure_is_not_retried() {
        let recognizer = ScriptedRecognizer::new(vec![Err("engine gone")]);
        let pipeline = DocumentPipeline::new(recognizer.clone(), PreprocessOptions::default());

        let err = pipeline.process_image(scan(), "eng").unwrap_err();

        assert!(matches!(err, OcrError::RecognizerUnavailable(_)));
        assert_eq!(recognizer.calls(), 1);
    }

    #[test]
    fn test_unreadable_file_fails_before_recognition() {
        let recognizer = ScriptedRecognizer::new(vec![]);
        let pipeline = DocumentPipeline::new(recognizer.clone(), PreprocessOptions::default());

        let err = pipeline
            .process_file(Path::new("no-such-scan.png"), "eng")
            .unwrap_err();

        assert!(matches!(err, OcrError::InvalidImage(_)));
        assert_eq!(recognizer.calls(), 0);
    }
}
