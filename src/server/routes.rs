//! HTTP route handlers for the chat proxy.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::services::ServeDir;

use super::proxy::chat_proxy;
use super::state::AppState;

/// Create the API router with all routes.
///
/// `/api/chat` accepts bodies of any size; the only input check is the
/// `message` field itself.
pub fn create_router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/chat",
            post(chat_proxy).layer(DefaultBodyLimit::disable()),
        )
        .route("/api/health", get(backend_health))
        .fallback_service(assets)
        .with_state(state)
}

/// Liveness of the proxy itself.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "codehelper-chat",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Probe `GET <backend>/health` and report the outcome.
async fn backend_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let healthy = match state.http.get(state.backend.health_url()).send().await {
        Ok(response) => response.status().is_success(),
        Err(e) => {
            tracing::warn!("backend health probe failed: {e}");
            false
        }
    };

    if healthy {
        (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "unavailable" })),
        )
    }
}
