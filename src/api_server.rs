use std::fs;
use std::path::{Path as FsPath, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::llm_gateway::CompletionClient;
use crate::pipeline;
use crate::schema::EvaluationReport;
use crate::stories::{Story, StoryError, StoryRegistry};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accuracy strings that earn the child a celebration in the UI.
const CELEBRATION_MARKERS: [&str; 2] = ["90%", "80%"];

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn CompletionClient>,
    pub stories: Arc<Mutex<StoryRegistry>>,
}

impl AppState {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            stories: Arc::new(Mutex::new(StoryRegistry::new())),
        }
    }

    fn stories(&self) -> Result<MutexGuard<'_, StoryRegistry>, ApiError> {
        self.stories
            .lock()
            .map_err(|_| ApiError::Internal("story registry lock poisoned".to_string()))
    }
}

#[derive(Deserialize)]
pub struct NewStoryRequest {
    pub title: String,
    pub text: String,
}

#[derive(Deserialize)]
pub struct EvaluateRequest {
    pub story_title: Option<String>,
    pub story_description: Option<String>,
    /// Base64 drawing, optionally as a `data:` URI.
    pub image_base64: String,
}

#[derive(Serialize)]
pub struct EvaluateResponse {
    pub report: EvaluationReport,
    pub celebrate: bool,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
    Pipeline(AppError),
}

impl From<StoryError> for ApiError {
    fn from(e: StoryError) -> Self {
        match e {
            StoryError::MissingField => ApiError::BadRequest(e.to_string()),
            StoryError::NotFound(_) => ApiError::NotFound(e.to_string()),
            StoryError::BuiltIn(_) => ApiError::Conflict(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        ApiError::Pipeline(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
            ApiError::Pipeline(e) => {
                let status = match e {
                    AppError::Transport(_)
                    | AppError::MissingField { .. }
                    | AppError::Parse(_)
                    | AppError::Validation(_) => StatusCode::BAD_GATEWAY,
                    AppError::Io(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                error!(error = %e, "evaluation failed");
                (status, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Drawing written to a temporary PNG for the length of one evaluation.
struct TempDrawing {
    path: PathBuf,
}

impl TempDrawing {
    fn from_base64(encoded: &str) -> Result<Self, ApiError> {
        let payload = match encoded.split_once(";base64,") {
            Some((prefix, data)) if prefix.starts_with("data:") => data,
            _ => encoded,
        };
        let bytes = general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ApiError::BadRequest(format!("image_base64 is not valid base64: {}", e)))?;
        let img = image::load_from_memory(&bytes)
            .map_err(|e| ApiError::BadRequest(format!("image_base64 is not an image: {}", e)))?;

        let path = std::env::temp_dir().join(format!("story_canvas_{}.png", uuid::Uuid::new_v4()));
        img.save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| ApiError::Internal(format!("failed to store drawing: {}", e)))?;
        Ok(Self { path })
    }

    fn path(&self) -> &FsPath {
        &self.path
    }
}

impl Drop for TempDrawing {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to remove temporary drawing");
        }
    }
}

pub fn should_celebrate(report: &EvaluationReport) -> bool {
    CELEBRATION_MARKERS.iter().any(|m| report.accuracy.contains(m))
}

pub fn router(state: AppState) -> Router {
    let allowed_origins = [
        HeaderValue::from_static("http://localhost:5173"),
        HeaderValue::from_static("http://localhost:8501"),
        HeaderValue::from_static("http://127.0.0.1:5173"),
        HeaderValue::from_static("http://127.0.0.1:8501"),
    ];
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/stories", get(list_stories).post(create_story))
        .route("/api/stories/:title", delete(delete_story))
        .route("/api/evaluate", post(evaluate_drawing))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_api_server(config: &Config, client: Arc<dyn CompletionClient>) -> anyhow::Result<()> {
    let app = router(AppState::new(client));

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind port {}: {}", config.port, e))?;
    info!("story canvas API listening on http://127.0.0.1:{}", config.port);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
    Ok(())
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_stories(State(state): State<AppState>) -> Result<Json<Vec<Story>>, ApiError> {
    Ok(Json(state.stories()?.list()))
}

async fn create_story(
    State(state): State<AppState>,
    payload: Result<Json<NewStoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Story>), ApiError> {
    let Json(req) = payload?;
    let story = state.stories()?.add(&req.title, &req.text)?;
    info!(title = %story.title, "custom story saved");
    Ok((StatusCode::CREATED, Json(story)))
}

async fn delete_story(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.stories()?.remove(&title)?;
    info!(%title, "custom story deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn evaluate_drawing(
    State(state): State<AppState>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Json<EvaluateResponse>, ApiError> {
    let Json(req) = payload?;
    let story = match (req.story_description, req.story_title) {
        (Some(text), _) if !text.trim().is_empty() => text,
        (_, Some(title)) => {
            let stories = state.stories()?;
            stories
                .get(&title)
                .map(|s| s.text)
                .ok_or(StoryError::NotFound(title))?
        }
        _ => {
            return Err(ApiError::BadRequest(
                "either story_description or story_title is required".to_string(),
            ))
        }
    };

    let drawing = TempDrawing::from_base64(&req.image_base64)?;
    let report = pipeline::evaluate(state.client.as_ref(), drawing.path(), &story).await?;

    Ok(Json(EvaluateResponse {
        celebrate: should_celebrate(&report),
        report,
    }))
}
