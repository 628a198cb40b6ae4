//! DTOs for link shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a single URL.
///
/// `original_url` may omit the scheme (`example.com/path`); `https://` is
/// assumed during normalization.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    #[validate(
        required(message = "URL is required"),
        length(min = 1, max = 2048, message = "URL must be 1-2048 characters")
    )]
    pub original_url: Option<String>,
}

/// Created short link.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_url: String,
    pub short_code: String,
    pub original_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_url_fails_validation() {
        let request: ShortenRequest = serde_json::from_str("{}").unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_empty_url_fails_validation() {
        let request: ShortenRequest = serde_json::from_str(r#"{"original_url": ""}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_oversized_url_fails_validation() {
        let request = ShortenRequest {
            original_url: Some(format!("https://example.com/{}", "a".repeat(2048))),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_present_url_passes_validation() {
        let request: ShortenRequest =
            serde_json::from_str(r#"{"original_url": "example.com/very/long/path"}"#).unwrap();
        assert!(request.validate().is_ok());
    }
}
