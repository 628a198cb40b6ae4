//! Response style negotiation.

use axum::http::{HeaderMap, header};

/// How a caller wants errors and metadata presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStyle {
    /// Programmatic client: JSON bodies.
    Json,
    /// Browser navigation: HTML pages.
    Html,
}

impl ResponseStyle {
    /// Classifies a request.
    ///
    /// A caller is treated as programmatic when it sends
    /// `X-Requested-With: XMLHttpRequest`, or when its `Accept` header asks
    /// for `application/json` without also asking for `text/html`. Everything
    /// else, including a missing `Accept`, is treated as a browser.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let xhr = headers
            .get("x-requested-with")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));
        if xhr {
            return Self::Json;
        }

        let accept = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if accept.contains("application/json") && !accept.contains("text/html") {
            Self::Json
        } else {
            Self::Html
        }
    }
}
