//! DTOs for admin endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::UrlMapping;

/// Admin login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required(message = "Password is required"))]
    pub password: Option<String>,
}

/// Successful admin login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub message: String,
}

/// A mapping as shown in the admin listing.
#[derive(Debug, Serialize)]
pub struct MappingResponse {
    pub short_code: String,
    pub original_url: String,
    pub visits: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UrlMapping> for MappingResponse {
    fn from(m: &UrlMapping) -> Self {
        Self {
            short_code: m.short_code.clone(),
            original_url: m.original_url.clone(),
            visits: m.visits,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Result of a delete operation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted_count: u64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_response_uses_camel_case() {
        let body = serde_json::to_value(DeleteResponse {
            success: true,
            deleted_count: 1,
            message: "URL deleted successfully".to_string(),
        })
        .unwrap();

        assert_eq!(body["deletedCount"], 1);
        assert_eq!(body["success"], true);
    }

    #[test]
    fn test_mapping_response_fields() {
        let now = Utc::now();
        let mapping = UrlMapping::new(
            3,
            "aZ3x9Q".to_string(),
            "https://example.com/".to_string(),
            7,
            now,
            now,
        );

        let body = serde_json::to_value(MappingResponse::from(&mapping)).unwrap();

        assert_eq!(body["short_code"], "aZ3x9Q");
        assert_eq!(body["visits"], 7);
        assert!(body.get("id").is_none());
    }
}
