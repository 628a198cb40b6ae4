//! Handler for short URL redirect.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::debug;

use crate::api::dto::redirect::RedirectResponse;
use crate::error::AppError;
use crate::state::AppState;
use crate::web::{ResponseStyle, error_page};

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Check the redirect cache; a hit queues the visit for the worker
/// 2. On a miss, look up and count the visit in one store call
/// 3. Return 302 Found with `Location`
///
/// Programmatic callers (JSON `Accept` or `X-Requested-With`) also get a
/// JSON body with the code and destination. Errors are JSON for them and an
/// HTML page for browsers; the status code is the same either way.
///
/// # Errors
///
/// Returns 404 Not Found if the code does not exist.
/// Returns 500 if the store fails or times out.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let style = ResponseStyle::from_headers(&headers);

    let resolved = match state.redirect_service.resolve(&code).await {
        Ok(resolved) => resolved,
        Err(e) => return error_response(style, e),
    };

    debug!(
        short_code = %resolved.short_code,
        cache_hit = resolved.cache_hit,
        "Redirecting"
    );

    let Ok(location) = HeaderValue::from_str(&resolved.original_url) else {
        // Stored URLs are normalized, so this only trips on corrupted rows.
        let e = AppError::internal(
            "Stored destination is not a valid header value",
            json!({ "short_code": resolved.short_code }),
        );
        return error_response(style, e);
    };

    match style {
        ResponseStyle::Json => (
            StatusCode::FOUND,
            [(header::LOCATION, location)],
            Json(RedirectResponse {
                short_code: resolved.short_code,
                original_url: resolved.original_url,
            }),
        )
            .into_response(),
        ResponseStyle::Html => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
    }
}

fn error_response(style: ResponseStyle, error: AppError) -> Response {
    match style {
        ResponseStyle::Json => error.into_response(),
        ResponseStyle::Html => error_page(&error),
    }
}
