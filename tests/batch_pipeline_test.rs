//! End-to-end pipeline tests over real files, with a stubbed recognizer

use image::{DynamicImage, GrayImage, Luma};
use papyrus_ocr::batch::{self, BatchOptions};
use papyrus_ocr::pipeline::DocumentPipeline;
use papyrus_ocr::preprocessing::PreprocessOptions;
use papyrus_ocr::recognizer::Recognizer;
use papyrus_ocr::error::OcrError;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Recognizer stub returning a fixed transcript for any image
struct FixedRecognizer {
    text: &'static str,
}

impl Recognizer for FixedRecognizer {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn description(&self) -> &'static str {
        "test stub"
    }

    fn recognize(&self, _image: &DynamicImage, _language: &str) -> Result<String, OcrError> {
        Ok(self.text.to_string())
    }

    fn supported_languages(&self) -> Vec<String> {
        vec!["eng".to_string()]
    }
}

/// Dark text band on a light page, enough contrast for binarization
fn write_scan(path: &Path) {
    let mut img = GrayImage::from_pixel(120, 80, Luma([235]));
    for x in 20..100 {
        for y in 38..42 {
            img.put_pixel(x, y, Luma([25]));
        }
    }
    img.save(path).unwrap();
}

#[test]
fn batch_processes_good_image_and_skips_bad() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_scan(&input.path().join("note.png"));
    fs::write(input.path().join("broken.png"), b"not an image").unwrap();
    fs::write(input.path().join("readme.txt"), "not a scan").unwrap();

    let recognizer = Arc::new(FixedRecognizer {
        text: "Groceries:\n- milk\n\n\n\n. ,\n1. call home",
    });
    let options = BatchOptions {
        input_dir: input.path().to_path_buf(),
        output_dir: output.path().to_path_buf(),
        language: "eng".to_string(),
        preprocess: PreprocessOptions::default(),
    };

    let summary = batch::run(recognizer, &options).unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 1);

    // Four artifacts for the good scan
    let processed = output.path().join("images_processed/note_processed.png");
    let ocr_raw = output.path().join("ocr_raw/note_ocr_raw.txt");
    let ocr_processed = output.path().join("ocr_processed/note_ocr_processed.txt");
    let cleaned = output.path().join("cleaned_text/note_cleaned.txt");

    assert!(processed.exists());
    assert!(ocr_raw.exists());
    assert!(ocr_processed.exists());
    assert!(cleaned.exists());

    // The published image is recognition-ready: two-level
    let reloaded = image::open(&processed).unwrap().to_luma8();
    assert!(reloaded.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));

    // Raw OCR artifacts carry the recognizer output verbatim
    assert_eq!(
        fs::read_to_string(&ocr_raw).unwrap(),
        "Groceries:\n- milk\n\n\n\n. ,\n1. call home"
    );

    // Cleaned text is normalized and list-indented
    assert_eq!(
        fs::read_to_string(&cleaned).unwrap(),
        "Groceries:\n  - milk\n\n  1. call home"
    );

    // Nothing was produced for the undecodable scan
    assert!(!output
        .path()
        .join("images_processed/broken_processed.png")
        .exists());
}

#[test]
fn document_pipeline_processes_a_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let scan_path = dir.path().join("page.png");
    write_scan(&scan_path);

    let recognizer = Arc::new(FixedRecognizer {
        text: "Meeting  notes\n\n\n\n* first   point",
    });
    let pipeline = DocumentPipeline::new(recognizer, PreprocessOptions::default());

    let doc = pipeline.process_file(&scan_path, "eng").unwrap();

    assert_eq!(doc.cleaned_text, "Meeting notes\n\n  * first point");
    assert_eq!(doc.processed_image.width(), 120);
    assert_eq!(doc.processed_image.height(), 80);
}
