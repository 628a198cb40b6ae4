//! API route configuration.
//!
//! Admin mapping endpoints require a Bearer session token via
//! [`crate::api::middleware::auth`]; shortening and login are public.

use crate::api::handlers::{
    delete_all_handler, delete_mapping_handler, list_mappings_handler, login_handler,
    shorten_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Admin routes, to be wrapped in the auth layer.
///
/// # Endpoints
///
/// - `GET    /admin/urls`        - List all mappings, newest first
/// - `DELETE /admin/urls`        - Delete every mapping
/// - `DELETE /admin/urls/{code}` - Delete one mapping
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/urls",
            get(list_mappings_handler).delete(delete_all_handler),
        )
        .route("/admin/urls/{code}", delete(delete_mapping_handler))
}

/// Routes open to anonymous callers.
///
/// # Endpoints
///
/// - `POST /shorten` - Create a short link
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/shorten", post(shorten_handler))
}

/// `POST /admin/login`, public but under the admin rate limit.
pub fn login_routes() -> Router<AppState> {
    Router::new().route("/admin/login", post(login_handler))
}
