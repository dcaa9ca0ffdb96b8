// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Ollama HTTP Surface
//
// Routes, CORS and error mapping for the Ollama-compatible API. Model
// management endpoints are accepted and answered without doing anything
// because models live with the cloud backends.

use axum::{
    body::{Body, Bytes},
    extract::{Path, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::application::streaming::StreamingEmitter;
use crate::application::translation::{ProxyError, ProxyRequest, ProxyService};
use crate::domain::ollama::{self, ModelSummary, ShowRequest, TagsResponse};

pub const PROXY_NAME: &str = "ollama-bridge";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const CORS_MAX_AGE: Duration = Duration::from_secs(86400);

pub struct AppState {
    pub service: ProxyService,
    pub emitter: StreamingEmitter,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(service: ProxyService, emitter: StreamingEmitter) -> Self {
        Self {
            service,
            emitter,
            started_at: Instant::now(),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let state = Arc::new(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(CORS_MAX_AGE);

    Router::new()
        .route("/", get(root))
        .route("/api", get(api_info))
        .route("/api/generate", post(generate))
        .route("/api/chat", post(chat))
        .route("/api/tags", get(tags))
        .route("/v1/models", get(tags))
        .route("/models", get(tags))
        .route("/api/version", get(version))
        .route("/api/show", post(show))
        .route("/api/show/{model}", get(show_by_path))
        .route("/api/pull", post(managed_by_backends))
        .route("/api/push", post(managed_by_backends))
        .route("/api/create", post(managed_by_backends))
        .route("/api/copy", post(managed_by_backends))
        .route("/api/delete", delete(managed_by_backends))
        .route("/api/ps", post(ps).get(ps))
        .route("/api/stop", post(stop))
        .route("/api/embeddings", post(embeddings))
        .route("/health", get(health))
        .route("/status", get(health))
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(options_no_content))
        .layer(TraceLayer::new_for_http())
}

/// Error body is always `{"error": "..."}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Proxy(ProxyError),
    NotImplemented(&'static str),
}

impl From<ProxyError> for ApiError {
    fn from(e: ProxyError) -> Self {
        ApiError::Proxy(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Proxy(e) if e.is_client_error() => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Proxy(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::NotImplemented(message) => (StatusCode::NOT_IMPLEMENTED, message.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

// Bodies are accepted regardless of content type; Ollama clients are not
// consistent about sending one.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid request body: {}", e)))
}

/// CORS preflight is answered with 204 and an empty body
async fn options_no_content(request: Request, next: Next) -> Response {
    if request.method() != Method::OPTIONS {
        return next.run(request).await;
    }

    let mut response = next.run(request).await;
    *response.status_mut() = StatusCode::NO_CONTENT;
    *response.body_mut() = Body::empty();
    response
}

async fn root() -> &'static str {
    "Ollama is running in proxy mode."
}

async fn api_info() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Ollama API proxy",
        "version": VERSION,
    }))
}

async fn generate(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    match parse_body::<ollama::GenerateRequest>(&body) {
        Ok(req) => complete(&state, ProxyRequest::Generate(req)).await,
        Err(e) => e.into_response(),
    }
}

async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    match parse_body::<ollama::ChatRequest>(&body) {
        Ok(req) => complete(&state, ProxyRequest::Chat(req)).await,
        Err(e) => e.into_response(),
    }
}

async fn complete(state: &AppState, request: ProxyRequest) -> Response {
    let outcome = state.service.reply(&request).await;

    if !request.stream() {
        return match outcome {
            Ok(reply) => Json(reply).into_response(),
            Err(e) => ApiError::from(e).into_response(),
        };
    }

    if let Err(e) = &outcome {
        error!("Streaming request for {} failed: {}", request.model(), e);
    }

    let frames = state.emitter.frames(request.kind(), request.model(), outcome);
    let body = Body::from_stream(state.emitter.into_stream(frames));

    let mut response = body.into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/x-ndjson"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    response
}

async fn tags(State(state): State<Arc<AppState>>) -> Json<TagsResponse> {
    let now = Utc::now();
    let catalog = state.service.catalog().read();
    let mut models: Vec<ModelSummary> = catalog
        .list_enabled()
        .into_iter()
        .map(|entry| ModelSummary::from_entry(entry, now))
        .collect();
    models.sort_by(|a, b| a.name.cmp(&b.name));

    Json(TagsResponse { models })
}

async fn version(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "version": VERSION,
        "proxy": PROXY_NAME,
        "backends": state.service.registry().list_available(),
    }))
}

fn show_model(state: &AppState, name: Option<&str>) -> Result<Json<ModelSummary>, ApiError> {
    let name = name.ok_or_else(|| ApiError::BadRequest("model parameter is required".to_string()))?;

    let catalog = state.service.catalog().read();
    catalog
        .lookup(name)
        .filter(|entry| entry.enabled)
        .map(|entry| Json(ModelSummary::from_entry(entry, Utc::now())))
        .ok_or_else(|| ApiError::BadRequest("model not found".to_string()))
}

async fn show(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Json<ModelSummary>, ApiError> {
    let req: ShowRequest = parse_body(&body)?;
    show_model(&state, req.model_name())
}

async fn show_by_path(
    State(state): State<Arc<AppState>>,
    Path(model): Path<String>,
) -> Result<Json<ModelSummary>, ApiError> {
    show_model(&state, Some(model.as_str()).filter(|m| !m.is_empty()))
}

async fn managed_by_backends() -> Json<serde_json::Value> {
    Json(json!({"status": "success", "message": "Models are managed by backends"}))
}

async fn ps() -> Json<serde_json::Value> {
    Json(json!({"status": "success", "message": "No local processes"}))
}

async fn stop() -> Json<serde_json::Value> {
    Json(json!({"status": "success", "message": "No local processes to stop"}))
}

async fn embeddings() -> ApiError {
    ApiError::NotImplemented("embeddings not implemented")
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let backends = state.service.registry().list_available();
    let total_models = state.service.catalog().read().list_enabled().len();

    Json(json!({
        "status": "healthy",
        "available_backends": backends.len(),
        "total_models": total_models,
        "backends": backends,
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}
