//! UrlMapping entity representing a short code to destination association.

use chrono::{DateTime, Utc};

/// A persisted short link together with its visit counter.
///
/// `short_code` is unique across all mappings. `visits` only ever grows and is
/// modified exclusively by the redirect path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMapping {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub visits: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UrlMapping {
    /// Creates a new UrlMapping instance.
    pub fn new(
        id: i64,
        short_code: String,
        original_url: String,
        visits: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            short_code,
            original_url,
            visits,
            created_at,
            updated_at,
        }
    }

    /// Returns true if the mapping has never been resolved.
    pub fn is_unvisited(&self) -> bool {
        self.visits == 0
    }
}

/// Input data for creating a new mapping.
#[derive(Debug, Clone)]
pub struct NewMapping {
    pub short_code: String,
    pub original_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_creation() {
        let now = Utc::now();
        let mapping = UrlMapping::new(
            1,
            "aZ3x9Q".to_string(),
            "https://example.com/very/long/path".to_string(),
            0,
            now,
            now,
        );

        assert_eq!(mapping.id, 1);
        assert_eq!(mapping.short_code, "aZ3x9Q");
        assert_eq!(mapping.original_url, "https://example.com/very/long/path");
        assert!(mapping.is_unvisited());
        assert_eq!(mapping.created_at, mapping.updated_at);
    }

    #[test]
    fn test_mapping_with_visits() {
        let now = Utc::now();
        let mapping = UrlMapping::new(
            7,
            "q1w2e3".to_string(),
            "https://rust-lang.org/".to_string(),
            42,
            now,
            now,
        );

        assert!(!mapping.is_unvisited());
        assert_eq!(mapping.visits, 42);
    }
}
