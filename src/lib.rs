//! OCR preparation for scanned documents.
//!
//! Two core stages: an image-preprocessing pipeline that turns an arbitrary
//! raster scan into a skew-corrected, binarized image, and a text-cleanup
//! pipeline that turns raw recognizer output into paragraph- and
//! list-structured text. Around them sit the recognizer boundary, an HTTP
//! service, and a directory batch runner.

pub mod batch;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod preprocessing;
pub mod recognizer;
pub mod recognizers;
pub mod server;
pub mod text;
