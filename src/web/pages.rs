//! Server-rendered error page.

use askama::Template;
use askama_web::WebTemplate;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::AppError;
use crate::web::ResponseStyle;

/// Template for error pages.
///
/// Renders `templates/error.html` with the status code, its reason phrase and
/// a human-readable message.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub status: u16,
    pub title: String,
    pub message: String,
}

/// Renders `error` as an HTML page with the matching status code.
///
/// Internal errors show a generic message; their details are already logged
/// by the JSON path and are never shown to browsers.
pub fn error_page(error: &AppError) -> Response {
    let status = error.status();

    let message = match error {
        AppError::NotFound { .. } => {
            "This short link does not exist or has been removed.".to_string()
        }
        AppError::Internal { message, .. } => {
            tracing::error!(error = %message, "Internal error on redirect path");
            "Something went wrong on our side. Please try again later.".to_string()
        }
        other => other.to_string(),
    };

    let page = ErrorPage {
        status: status.as_u16(),
        title: status
            .canonical_reason()
            .unwrap_or("Error")
            .to_string(),
        message,
    };

    (status, page).into_response()
}

/// Fallback for requests that matched no route.
pub async fn not_found_fallback(headers: HeaderMap) -> Response {
    if ResponseStyle::from_headers(&headers) == ResponseStyle::Json {
        return AppError::not_found("Route not found", json!({})).into_response();
    }

    let page = ErrorPage {
        status: StatusCode::NOT_FOUND.as_u16(),
        title: "Not Found".to_string(),
        message: "There is nothing here.".to_string(),
    };

    (StatusCode::NOT_FOUND, page).into_response()
}
