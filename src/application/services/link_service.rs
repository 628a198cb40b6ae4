//! Short link creation and administration service.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::{NewMapping, UrlMapping};
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, ListingCache};
use crate::metrics;
use crate::utils::code_generator::{generate_code, is_valid_code};
use crate::utils::url_normalizer::normalize_url;

/// Attempts at finding a free code before giving up.
const MAX_CODE_ATTEMPTS: usize = 10;

/// Service for creating, listing and deleting short links.
///
/// Owns cache invalidation for every write: a deleted mapping is evicted from
/// the redirect cache before the call returns, and the admin listing is
/// dropped on any create or delete.
pub struct LinkService<R: MappingRepository + ?Sized> {
    repository: Arc<R>,
    cache: Arc<dyn CacheService>,
    listing_cache: ListingCache,
    code_length: usize,
}

impl<R: MappingRepository + ?Sized> LinkService<R> {
    /// Creates a new link service.
    ///
    /// # Arguments
    ///
    /// - `repository` - mapping store
    /// - `cache` - redirect cache shared with the resolver
    /// - `listing_ttl` - how long the admin listing may be served from memory
    /// - `code_length` - number of characters in generated codes
    pub fn new(
        repository: Arc<R>,
        cache: Arc<dyn CacheService>,
        listing_ttl: Duration,
        code_length: usize,
    ) -> Self {
        Self {
            repository,
            cache,
            listing_cache: ListingCache::new(listing_ttl),
            code_length,
        }
    }

    /// Creates a short link for `original_url`.
    ///
    /// The URL is normalized first (`https://` is assumed when no scheme is
    /// given). A fresh random code is generated for every attempt; if the
    /// store reports the code as taken, a new one is drawn, up to 10 times.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is empty, malformed, or not
    /// http(s). Returns [`AppError::Internal`] if no free code was found or
    /// the store fails.
    pub async fn shorten(&self, original_url: &str) -> Result<UrlMapping, AppError> {
        let normalized_url = normalize_url(original_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let short_code = generate_code(self.code_length).map_err(|e| {
                AppError::internal(
                    "Failed to generate short code",
                    json!({ "reason": e.to_string() }),
                )
            })?;

            let new_mapping = NewMapping {
                short_code,
                original_url: normalized_url.clone(),
            };

            match self.repository.insert(new_mapping).await {
                Ok(mapping) => {
                    self.listing_cache.invalidate().await;
                    metrics::mapping_created();
                    info!(
                        short_code = %mapping.short_code,
                        original_url = %mapping.original_url,
                        "Short link created"
                    );
                    return Ok(mapping);
                }
                Err(AppError::Conflict { .. }) => {
                    metrics::code_collision();
                    debug!(attempt, "Generated code already taken, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(attempts = MAX_CODE_ATTEMPTS, "Gave up generating a unique code");
        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions" }),
        ))
    }

    /// Returns every mapping, newest first.
    ///
    /// Served from the listing cache when fresh, so visit counts may lag by
    /// up to the listing TTL.
    pub async fn list_mappings(&self) -> Result<Arc<Vec<UrlMapping>>, AppError> {
        if let Some(cached) = self.listing_cache.get().await {
            return Ok(cached);
        }

        let mappings = Arc::new(self.repository.list().await?);
        self.listing_cache.set(mappings.clone()).await;

        Ok(mappings)
    }

    /// Deletes a single mapping and evicts it from both caches.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no mapping has this code.
    pub async fn delete_mapping(&self, short_code: &str) -> Result<u64, AppError> {
        let deleted = if is_valid_code(short_code) {
            self.repository.delete(short_code).await?
        } else {
            0
        };

        if deleted == 0 {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "short_code": short_code }),
            ));
        }

        if let Err(e) = self.cache.invalidate(short_code).await {
            warn!(error = %e, short_code, "Failed to evict deleted mapping from cache");
        }
        self.listing_cache.invalidate().await;

        info!(short_code, "Short link deleted");
        Ok(deleted)
    }

    /// Deletes every mapping and clears both caches.
    pub async fn delete_all(&self) -> Result<u64, AppError> {
        let deleted = self.repository.delete_all().await?;

        if let Err(e) = self.cache.invalidate_all().await {
            warn!(error = %e, "Failed to clear redirect cache");
        }
        self.listing_cache.invalidate().await;

        info!(deleted, "All short links deleted");
        Ok(deleted)
    }

    /// Number of stored mappings. Doubles as a storage liveness probe.
    pub async fn count(&self) -> Result<i64, AppError> {
        self.repository.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockMappingRepository;
    use crate::infrastructure::cache::MemoryCache;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn mapping(id: i64, code: &str, url: &str) -> UrlMapping {
        let now = Utc::now();
        UrlMapping::new(id, code.to_string(), url.to_string(), 0, now, now)
    }

    fn service_with(
        mock_repo: MockMappingRepository,
    ) -> (LinkService<MockMappingRepository>, Arc<MemoryCache>) {
        let cache = Arc::new(MemoryCache::new(100, Duration::from_secs(60)));
        let service = LinkService::new(
            Arc::new(mock_repo),
            cache.clone(),
            Duration::from_secs(10),
            6,
        );
        (service, cache)
    }

    #[tokio::test]
    async fn test_shorten_normalizes_and_inserts() {
        let mut mock_repo = MockMappingRepository::new();

        mock_repo
            .expect_insert()
            .withf(|m| {
                m.original_url == "https://example.com/very/long/path"
                    && m.short_code.len() == 6
                    && is_valid_code(&m.short_code)
            })
            .times(1)
            .returning(|m| Ok(mapping(1, &m.short_code, &m.original_url)));

        let (service, _) = service_with(mock_repo);

        let created = service.shorten("example.com/very/long/path").await.unwrap();

        assert_eq!(created.original_url, "https://example.com/very/long/path");
        assert_eq!(created.short_code.len(), 6);
        assert_eq!(created.visits, 0);
    }

    #[tokio::test]
    async fn test_shorten_rejects_invalid_url() {
        let mut mock_repo = MockMappingRepository::new();
        mock_repo.expect_insert().times(0);

        let (service, _) = service_with(mock_repo);

        let err = service.shorten("javascript:alert(1)").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let err = service.shorten("   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_shorten_retries_on_collision() {
        let mut mock_repo = MockMappingRepository::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        mock_repo.expect_insert().times(3).returning(move |m| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(AppError::conflict("Short code already exists", json!({})))
            } else {
                Ok(mapping(1, &m.short_code, &m.original_url))
            }
        });

        let (service, _) = service_with(mock_repo);

        assert!(service.shorten("https://example.com").await.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_shorten_gives_up_after_max_attempts() {
        let mut mock_repo = MockMappingRepository::new();

        mock_repo
            .expect_insert()
            .times(MAX_CODE_ATTEMPTS)
            .returning(|_| Err(AppError::conflict("Short code already exists", json!({}))));

        let (service, _) = service_with(mock_repo);

        let err = service.shorten("https://example.com").await.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_shorten_propagates_store_errors_without_retry() {
        let mut mock_repo = MockMappingRepository::new();

        mock_repo
            .expect_insert()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let (service, _) = service_with(mock_repo);

        let err = service.shorten("https://example.com").await.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_list_is_served_from_listing_cache() {
        let mut mock_repo = MockMappingRepository::new();

        mock_repo
            .expect_list()
            .times(1)
            .returning(|| Ok(vec![mapping(1, "abc123", "https://example.com/")]));

        let (service, _) = service_with(mock_repo);

        assert_eq!(service.list_mappings().await.unwrap().len(), 1);
        assert_eq!(service.list_mappings().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_invalidates_listing_cache() {
        let mut mock_repo = MockMappingRepository::new();

        mock_repo.expect_list().times(2).returning(|| Ok(vec![]));
        mock_repo
            .expect_insert()
            .times(1)
            .returning(|m| Ok(mapping(1, &m.short_code, &m.original_url)));

        let (service, _) = service_with(mock_repo);

        service.list_mappings().await.unwrap();
        service.shorten("https://example.com").await.unwrap();
        service.list_mappings().await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_evicts_redirect_cache() {
        let mut mock_repo = MockMappingRepository::new();

        mock_repo
            .expect_delete()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(1));

        let (service, cache) = service_with(mock_repo);
        cache
            .set_url("abc123", "https://example.com/", None)
            .await
            .unwrap();

        assert_eq!(service.delete_mapping("abc123").await.unwrap(), 1);
        assert!(cache.get_url("abc123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let mut mock_repo = MockMappingRepository::new();

        mock_repo.expect_delete().times(1).returning(|_| Ok(0));

        let (service, _) = service_with(mock_repo);

        let err = service.delete_mapping("nope12").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_malformed_code_skips_store() {
        let mut mock_repo = MockMappingRepository::new();
        mock_repo.expect_delete().times(0);

        let (service, _) = service_with(mock_repo);

        let err = service.delete_mapping("bad code!").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_all_clears_cache() {
        let mut mock_repo = MockMappingRepository::new();

        mock_repo.expect_delete_all().times(1).returning(|| Ok(3));

        let (service, cache) = service_with(mock_repo);
        cache
            .set_url("abc123", "https://example.com/", None)
            .await
            .unwrap();

        assert_eq!(service.delete_all().await.unwrap(), 3);
        assert!(cache.get_url("abc123").await.unwrap().is_none());
    }
}
