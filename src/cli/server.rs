//! HTTP server exposing read-only aggregate views of the warehouse

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::store::read_snapshot;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Where and what to read
    pub pipeline: PipelineConfig,
}

impl ServerConfig {
    pub fn new(pipeline: PipelineConfig) -> Self {
        Self { pipeline }
    }
}

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    config: ServerConfig,
}

/// Build the router
pub fn router(config: ServerConfig) -> Router {
    let state = AppState { config };

    // Build CORS layer - any origin may read the metrics
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/metrics", get(get_metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig, port: u16) -> Result<()> {
    let database = config.pipeline.database.display().to_string();
    let app = router(config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Serving metrics from {} on http://{}", database, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Severity counts, vitals by type and all records
async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let pipeline = state.config.pipeline.clone();
    let snapshot = tokio::task::spawn_blocking(move || read_snapshot(&pipeline)).await;

    match snapshot {
        Ok(Ok(snapshot)) => (StatusCode::OK, Json(snapshot)).into_response(),
        Ok(Err(e)) => {
            tracing::error!("Failed to read metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Metrics task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "metrics task failed" })),
            )
                .into_response()
        }
    }
}
