//! Service health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::context::AppContext;

/// `GET /health`: directory reachability and registry size
pub async fn health_check(State(ctx): State<AppContext>) -> impl IntoResponse {
    let connections = ctx.registry.len().await;

    match ctx.directory.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "registered_connections": connections,
            })),
        ),
        Err(e) => {
            tracing::warn!("Directory health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "version": env!("CARGO_PKG_VERSION"),
                    "registered_connections": connections,
                    "error": "tenant directory unavailable",
                })),
            )
        }
    }
}
