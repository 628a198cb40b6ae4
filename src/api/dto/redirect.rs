//! DTO for the redirect endpoint.

use serde::Serialize;

/// Body sent alongside the redirect to programmatic callers.
#[derive(Debug, Serialize)]
pub struct RedirectResponse {
    pub short_code: String,
    pub original_url: String,
}
