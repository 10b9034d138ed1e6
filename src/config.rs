use crate::preprocessing::PreprocessOptions;

/// Runtime configuration, built once from the parsed CLI and passed down.
/// There is no process-global state; every pipeline receives its options
/// explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub default_language: String,
    pub max_file_size: usize,
    pub tessdata_path: Option<String>,
    pub preprocess: PreprocessOptions,
}

impl Config {
    /// Configuration for one-shot batch runs, which have no server surface
    pub fn for_batch(language: &str, tessdata_path: Option<String>, deskew: bool) -> Self {
        Self {
            host: String::new(),
            port: 0,
            default_language: language.to_string(),
            max_file_size: 0,
            tessdata_path,
            preprocess: PreprocessOptions { deskew },
        }
    }
}
