//! Dashboard HTTP API

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use super::types::*;
use crate::oracle::SnapshotService;

/// Create the API router with all endpoints
pub fn create_router(service: Arc<SnapshotService>) -> Router {
    Router::new()
        .route("/api/snapshot", get(get_snapshot))
        .route("/api/health", get(get_health))
        .with_state(service)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

// ─────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct SnapshotQuery {
    #[serde(default)]
    refresh: bool,
}

/// GET /api/snapshot?refresh=true
async fn get_snapshot(
    Query(query): Query<SnapshotQuery>,
    State(service): State<Arc<SnapshotService>>,
) -> impl IntoResponse {
    let snapshot = if query.refresh {
        service.refresh().await
    } else {
        service.get_snapshot().await
    };

    if snapshot.is_empty() {
        tracing::warn!("Snapshot request returned no data from any source");
    }
    Json(ApiResponse::success(SnapshotView::from(&snapshot)))
}

/// GET /api/health
async fn get_health() -> impl IntoResponse {
    Json(ApiResponse::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp_millis(),
    }))
}
