//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`      - Short link redirect (public)
//! - `GET  /health`      - Health check: storage, cache, visit queue (public)
//! - `/api/*`            - Shortening (public) and admin (Bearer token)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Authentication** - Bearer session token on admin routes
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use crate::web::not_found_fallback;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// How client IPs are keyed for rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimiting {
    Disabled,
    /// Key on the socket peer address.
    PeerIp,
    /// Key on forwarding headers set by a trusted proxy.
    ProxyHeaders,
}

impl RateLimiting {
    pub fn from_flags(enabled: bool, behind_proxy: bool) -> Self {
        match (enabled, behind_proxy) {
            (false, _) => Self::Disabled,
            (true, false) => Self::PeerIp,
            (true, true) => Self::ProxyHeaders,
        }
    }

    fn public(self, router: Router<AppState>) -> Router<AppState> {
        match self {
            Self::Disabled => router,
            Self::PeerIp => router.layer(rate_limit::layer()),
            Self::ProxyHeaders => router.layer(rate_limit::proxied_layer()),
        }
    }

    fn secure(self, router: Router<AppState>) -> Router<AppState> {
        match self {
            Self::Disabled => router,
            Self::PeerIp => router.layer(rate_limit::secure_layer()),
            Self::ProxyHeaders => router.layer(rate_limit::proxied_secure_layer()),
        }
    }
}

/// Builds the application router with all routes and middleware.
///
/// Peer-IP rate limiting needs the server to be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn router(state: AppState, rate_limiting: RateLimiting) -> Router {
    let admin_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let api_router = Router::new()
        .merge(rate_limiting.secure(admin_router.merge(api::routes::login_routes())))
        .merge(rate_limiting.public(api::routes::public_routes()));

    let redirect_router = rate_limiting.public(Router::new().route("/{code}", get(redirect_handler)));

    Router::new()
        .merge(redirect_router)
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .fallback(not_found_fallback)
        .with_state(state)
        .layer(tracing::layer())
}

/// [`router`] with trailing slashes trimmed before routing.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `rate_limiting` - whether and how to key per-IP limits; use
///   [`RateLimiting::ProxyHeaders`] only behind a trusted reverse proxy
pub fn app_router(state: AppState, rate_limiting: RateLimiting) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, rate_limiting))
}
