//! HTTP API for pipeline submissions.
//!
//! ```text
//! GET  /                       -> {"Ping": "Pong"}
//! POST /pipelines/parse        -> check + store a pipeline
//! GET  /pipelines/last-submit  -> every client's history
//! GET  /pipelines/{client_id}  -> one client's history
//! ```

use crate::config::ServiceConfig;
use crate::core::PipelineService;
use crate::error::PipelineError;
use crate::models::{ClientHistory, ParseResponse, PipelineRequest};
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    service: Arc<Mutex<PipelineService>>,
}

impl AppState {
    pub fn new(service: PipelineService) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
        }
    }
}

/// Error wrapper that renders as a JSON body
#[derive(Debug)]
pub struct AppError(pub PipelineError);

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PipelineError::ClientNotFound(_) => {
                return (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" })))
                    .into_response();
            }
            PipelineError::TooManyNodes { .. } | PipelineError::TooManyEdges { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            PipelineError::Json(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, "request rejected");
        }

        (
            status,
            Json(json!({ "error": self.0.to_string(), "code": self.0.code() })),
        )
            .into_response()
    }
}

async fn ping_handler() -> Json<serde_json::Value> {
    Json(json!({ "Ping": "Pong" }))
}

async fn parse_handler(
    State(state): State<AppState>,
    Json(request): Json<PipelineRequest>,
) -> Result<Json<ParseResponse>, AppError> {
    let service = state.service.lock().await;
    Ok(Json(service.parse_pipeline(request)?))
}

async fn last_submit_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let service = state.service.lock().await;
    let histories: BTreeMap<String, ClientHistory> = service.all_histories()?;

    if histories.is_empty() {
        return Ok(Json(json!({ "message": "No previous submissions found." })).into_response());
    }
    Ok(Json(histories).into_response())
}

async fn history_handler(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<ClientHistory>, AppError> {
    let service = state.service.lock().await;
    Ok(Json(service.client_history(&client_id)?))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the router with CORS, tracing and body limit layers
pub fn router(state: AppState, config: &ServiceConfig) -> Router {
    Router::new()
        .route("/", get(ping_handler))
        .route("/pipelines/parse", post(parse_handler))
        .route("/pipelines/last-submit", get(last_submit_handler))
        .route("/pipelines/{client_id}", get(history_handler))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the store and serve until Ctrl-C
pub async fn run_server(config: ServiceConfig) -> anyhow::Result<()> {
    let service = PipelineService::open_at(&config.db_path, config.limits)?;
    let app = router(AppState::new(service), &config);

    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        db = %config.db_path.display(),
        origins = ?config.allowed_origins,
        "pipeline service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("pipeline service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
