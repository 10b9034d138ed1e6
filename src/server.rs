//! HTTP service layer
//!
//! Accepts one image per request and returns the cleaned text as JSON.
//! Uploads live in request-scoped temp files that are removed on every
//! exit path, success or failure.

use crate::config::Config;
use crate::error::OcrError;
use crate::pipeline::{DocumentPipeline, TextSource};
use crate::recognizers::RecognizerRegistry;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DocumentPipeline>,
    pub registry: Arc<RecognizerRegistry>,
    pub config: Arc<Config>,
}

/// Extraction response
#[derive(Serialize)]
pub struct ExtractTextResponse {
    pub filename: String,
    pub cleaned_text: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub default_engine: String,
    pub supported_languages: Vec<String>,
    pub max_file_size_bytes: usize,
    pub default_language: String,
    pub deskew_enabled: bool,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let registry = RecognizerRegistry::new(&config)?;
    let recognizer = registry
        .default()
        .ok_or_else(|| anyhow::anyhow!("no default recognizer"))?;
    let pipeline = DocumentPipeline::new(recognizer, config.preprocess);

    let addr = format!("{}:{}", config.host, config.port);
    let max_file_size = config.max_file_size;

    let state = AppState {
        pipeline: Arc::new(pipeline),
        registry: Arc::new(registry),
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/extract-text", post(handle_extract_text))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Handle extraction requests
async fn handle_extract_text(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractTextResponse>, OcrError> {
    let start = Instant::now();

    let mut file_data: Option<Bytes> = None;
    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut language: Option<String> = None;

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| OcrError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "image" => {
                filename = field.file_name().map(|s| s.to_string());
                content_type = field.content_type().map(|s| s.to_string());
                file_data = Some(field.bytes().await.map_err(|e| {
                    OcrError::InvalidRequest(format!("Failed to read image data: {}", e))
                })?);
            }
            "language" => {
                language =
                    Some(field.text().await.map_err(|e| {
                        OcrError::InvalidRequest(format!("Invalid language: {}", e))
                    })?);
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let data = file_data.ok_or(OcrError::MissingFile)?;
    let filename = filename.unwrap_or_else(|| "unknown_image".to_string());

    if data.len() > state.config.max_file_size {
        return Err(OcrError::ImageTooLarge {
            size: data.len(),
            max: state.config.max_file_size,
        });
    }

    let mime = content_type.unwrap_or_else(|| "application/octet-stream".to_string());
    if !mime.starts_with("image/") {
        tracing::warn!("Received file with content type: {}", mime);
    }

    // Determine file extension from mime type
    let extension = match mime.as_str() {
        "image/png" => ".png",
        "image/jpeg" => ".jpg",
        "image/gif" => ".gif",
        "image/bmp" => ".bmp",
        "image/webp" => ".webp",
        "image/tiff" => ".tiff",
        _ => ".tmp",
    };

    // Write to a temp file with a unique name; removal on drop covers
    // success, handled failure, and panic unwinds alike
    let mut temp_file = tempfile::Builder::new()
        .suffix(extension)
        .tempfile()
        .map_err(|e| OcrError::Internal(format!("Failed to create temp file: {}", e)))?;

    temp_file
        .write_all(&data)
        .map_err(|e| OcrError::Internal(format!("Failed to write temp file: {}", e)))?;

    let language = language.unwrap_or_else(|| state.config.default_language.clone());
    let doc = state.pipeline.process_file(temp_file.path(), &language)?;

    tracing::info!(
        "Extracted {} chars from {} in {}ms{}",
        doc.cleaned_text.len(),
        filename,
        start.elapsed().as_millis(),
        match doc.source {
            TextSource::Processed => "",
            TextSource::RawFallback => " (raw-image fallback)",
        }
    );

    Ok(Json(ExtractTextResponse {
        filename,
        cleaned_text: doc.cleaned_text,
    }))
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    let supported_languages = state
        .registry
        .default()
        .map(|engine| engine.supported_languages())
        .unwrap_or_default();

    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        default_engine: state.registry.default_name().to_string(),
        supported_languages,
        max_file_size_bytes: state.config.max_file_size,
        default_language: state.config.default_language.clone(),
        deskew_enabled: state.config.preprocess.deskew,
    })
}
