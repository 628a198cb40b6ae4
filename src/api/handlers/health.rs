//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Storage**: Counts mappings
/// 2. **Cache**: Backend ping
/// 3. **Visit Queue**: Channel open, pending events
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "timestamp": "2025-01-01T12:00:00Z",
///   "checks": {
///     "storage": { "status": "ok", "message": "42 mappings" },
///     "cache": { "status": "ok", "message": "memory cache reachable" },
///     "visit_queue": { "status": "ok", "message": "0/10000 pending" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let storage_check = check_storage(&state).await;

    let cache_check = check_cache(&state).await;

    let queue_check = check_visit_queue(&state);

    let all_healthy = storage_check.is_ok() && cache_check.is_ok() && queue_check.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        checks: HealthChecks {
            storage: storage_check,
            cache: cache_check,
            visit_queue: queue_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_storage(state: &AppState) -> CheckStatus {
    match state.link_service.count().await {
        Ok(count) => CheckStatus::ok(format!("{count} mappings")),
        Err(e) => CheckStatus::error(format!("Storage error: {e}")),
    }
}

/// A disabled cache (`none`) always reports healthy.
async fn check_cache(state: &AppState) -> CheckStatus {
    let backend = state.redirect_service.cache_backend();

    if state.redirect_service.cache_healthy().await {
        CheckStatus::ok(format!("{backend} cache reachable"))
    } else {
        CheckStatus::error(format!("{backend} cache unreachable"))
    }
}

fn check_visit_queue(state: &AppState) -> CheckStatus {
    let status = state.redirect_service.queue_status();

    if status.closed {
        CheckStatus::error("Visit queue is closed")
    } else {
        CheckStatus::ok(format!("{}/{} pending", status.pending, status.capacity))
    }
}
