use axum::{extract::Extension, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: DateTime<Utc>,
    database: String,
    scheduler: String,
}

/// Health check endpoint
///
/// Returns 200 OK when the store answers, 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let (is_healthy, database) = match state.store.health_check().await {
        Ok(()) => (true, "connected".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (false, format!("disconnected: {:#}", e))
        }
    };

    let scheduler = if state.scheduler.is_running().await {
        "running"
    } else {
        "stopped"
    };

    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            timestamp: Utc::now(),
            database,
            scheduler: scheduler.to_string(),
        }),
    )
}
