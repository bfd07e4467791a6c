//! HTTP surface: `/analyze/`, `/clear-outputs/` and the static mount for annotated images.

use std::sync::Arc;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tower_http::services::ServeDir;
use crate::batch_handler::{BatchRequestHandler, UploadedFile};
use crate::common::BatchResult;
use crate::data::ServerConfig;
use crate::detection_processing::DetectionPipeline;
use crate::detection_runners::Detector;
use crate::error::ScanError;
use crate::output::{OutputCleaner, OutputWriter};
use crate::visualizer::Visualizer;

/// Multipart field carrying the uploaded images.
pub const FILES_FIELD: &str = "files";

pub struct AppState {
    handler: Arc<BatchRequestHandler>,
    cleaner: OutputCleaner,
}

impl AppState {
    pub fn new(detector: Arc<dyn Detector>, config: &ServerConfig) -> anyhow::Result<Self> {
        let visualizer = Visualizer::new(config.label_font.as_deref())?;
        let pipeline = DetectionPipeline::new(detector, visualizer);
        let writer = OutputWriter::new(&config.output_dir, &config.mount_prefix);
        Ok(Self {
            handler: Arc::new(BatchRequestHandler::new(pipeline, writer)),
            cleaner: OutputCleaner::new(&config.output_dir),
        })
    }
}

/// Transport-level failures. Per-file problems never reach this type.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        log::warn!("Request failed with {}: {}", status, self);
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Body of `/clear-outputs/`; always sent with 200.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClearResponse {
    Message { message: String },
    Error { error: String },
}

pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let static_files = ServeDir::new(&config.output_dir);
    let router = Router::new()
        .route("/analyze/", post(analyze))
        .route("/clear-outputs/", get(clear_outputs));

    let router = if config.mount_prefix == "/" {
        router.fallback_service(static_files)
    } else {
        router.nest_service(&config.mount_prefix, static_files)
    };

    router
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(state)
}

async fn read_files(mut multipart: Multipart) -> Result<Vec<UploadedFile>, ApiError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {e}")))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read {filename}: {e}")))?;
        files.push(UploadedFile::new(filename, bytes.to_vec()));
    }
    Ok(files)
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<BatchResult>, ApiError> {
    let files = read_files(multipart).await?;
    if files.is_empty() {
        return Err(ApiError::Unprocessable(format!(
            "Field required: at least one `{FILES_FIELD}` part"
        )));
    }

    let handler = state.handler.clone();
    let result = tokio::task::spawn_blocking(move || handler.handle(&files))
        .await
        .map_err(|e| ApiError::Internal(format!("Batch worker failed: {e}")))?;

    Ok(Json(result))
}

async fn clear_outputs(State(state): State<Arc<AppState>>) -> Json<ClearResponse> {
    let cleaner = state.cleaner.clone();
    let outcome = tokio::task::spawn_blocking(move || cleaner.clear())
        .await
        .map_err(|e| ScanError::Task(e.to_string()))
        .and_then(|cleared| cleared);

    let response = match outcome {
        Ok(message) => ClearResponse::Message { message: message.to_string() },
        Err(e) => {
            log::error!("{e}");
            ClearResponse::Error { error: e.to_string() }
        }
    };
    Json(response)
}
