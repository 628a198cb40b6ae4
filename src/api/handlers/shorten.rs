//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::base_url::{build_short_url, resolve_base_url};

/// Creates a short link for a long URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "original_url": "example.com/very/long/path" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "short_url": "https://sho.rt/aB3_x9",
///   "short_code": "aB3_x9",
///   "original_url": "https://example.com/very/long/path"
/// }
/// ```
///
/// `short_url` is built from `BASE_URL` when configured, otherwise from the
/// request's `Host` and `X-Forwarded-Proto` headers.
///
/// # Errors
///
/// Returns 400 Bad Request if the body is not JSON, the URL is missing or
/// invalid, or no base URL can be determined.
pub async fn shorten_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        AppError::bad_request(
            "Invalid request body",
            json!({ "reason": rejection.body_text() }),
        )
    })?;
    payload.validate()?;

    let original_url = payload.original_url.unwrap_or_default();

    let base_url = resolve_base_url(state.base_url.as_deref(), &headers).ok_or_else(|| {
        AppError::bad_request(
            "Missing Host header",
            json!({ "reason": "Set BASE_URL or send a Host header" }),
        )
    })?;

    let mapping = state.link_service.shorten(&original_url).await?;

    Ok(Json(ShortenResponse {
        short_url: build_short_url(&base_url, &mapping.short_code),
        short_code: mapping.short_code,
        original_url: mapping.original_url,
    }))
}
