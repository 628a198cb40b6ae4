//! Public base URL resolution from HTTP request headers.

use axum::http::{HeaderMap, header};

/// Returns the externally visible base URL for building short links.
///
/// A configured `BASE_URL` always wins. Otherwise the base is derived from the
/// request: scheme from `X-Forwarded-Proto` (first value, defaulting to
/// `http`) and authority from the `Host` header, port included.
///
/// Returns `None` if there is no configured base and the `Host` header is
/// missing or not valid UTF-8.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert(header::HOST, "sho.rt:8080".parse().unwrap());
///
/// assert_eq!(
///     resolve_base_url(None, &headers).as_deref(),
///     Some("http://sho.rt:8080")
/// );
/// ```
pub fn resolve_base_url(configured: Option<&str>, headers: &HeaderMap) -> Option<String> {
    if let Some(base) = configured {
        return Some(base.trim_end_matches('/').to_string());
    }

    let host = headers.get(header::HOST)?.to_str().ok()?.trim();
    if host.is_empty() {
        return None;
    }

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| matches!(*v, "http" | "https"))
        .unwrap_or("http");

    Some(format!("{scheme}://{host}"))
}

/// Joins a base URL and a short code.
pub fn build_short_url(base_url: &str, short_code: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), short_code)
}
