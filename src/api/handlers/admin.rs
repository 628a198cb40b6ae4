//! Handlers for admin login and mapping management.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::api::dto::admin::{DeleteResponse, LoginRequest, LoginResponse, MappingResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Exchanges the admin password for a bearer token.
///
/// # Endpoint
///
/// `POST /api/admin/login`
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "token": "eyJzdWIiOiJhZG1pbiIs...",
///   "expires_at": "2025-01-01T12:00:00Z",
///   "message": "Login successful"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 if the password is missing, 401 if it is wrong.
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        AppError::bad_request(
            "Invalid request body",
            json!({ "reason": rejection.body_text() }),
        )
    })?;
    payload.validate()?;

    let session = state
        .auth_service
        .login(payload.password.as_deref().unwrap_or_default())?;

    info!(expires_at = %session.expires_at, "Admin logged in");

    Ok(Json(LoginResponse {
        success: true,
        token: session.token,
        expires_at: session.expires_at,
        message: "Login successful".to_string(),
    }))
}

/// Lists every mapping, newest first.
///
/// `GET /api/admin/urls`
pub async fn list_mappings_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<MappingResponse>>, AppError> {
    let mappings = state.link_service.list_mappings().await?;

    Ok(Json(mappings.iter().map(MappingResponse::from).collect()))
}

/// Deletes one mapping.
///
/// # Endpoint
///
/// `DELETE /api/admin/urls/{code}`
///
/// The redirect cache entry is evicted before the response is sent, so the
/// next `GET /{code}` is a 404.
///
/// # Errors
///
/// Returns 404 Not Found if nothing was deleted.
pub async fn delete_mapping_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let deleted_count = state.link_service.delete_mapping(&code).await?;

    Ok(Json(DeleteResponse {
        success: true,
        deleted_count,
        message: "URL deleted successfully".to_string(),
    }))
}

/// Deletes every mapping.
///
/// `DELETE /api/admin/urls`
pub async fn delete_all_handler(
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, AppError> {
    let deleted_count = state.link_service.delete_all().await?;

    Ok(Json(DeleteResponse {
        success: true,
        deleted_count,
        message: format!("Deleted {deleted_count} URLs"),
    }))
}
