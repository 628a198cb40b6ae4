//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Invalidation snapshot taken before a store read.
///
/// Passed back to [`CacheService::set_url_if_current`] so a destination read
/// before a delete is never written to the cache after that delete invalidated
/// it. Opaque outside the cache backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Generation {
    pub(super) epoch: u64,
    pub(super) code: u64,
}

/// Ephemeral short code → destination cache in front of the mapping store.
///
/// The cache is a lookup accelerator only: it never counts visits and is never
/// the source of truth. A `None` from [`get_url`](CacheService::get_url) means
/// "not in cache", not "does not exist".
///
/// Implementations must be thread-safe and fail open: backend errors are logged
/// and degrade to store lookups rather than failing the request.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::MemoryCache`] - in-process, TTL + capacity bound
/// - [`crate::infrastructure::cache::RedisCache`] - shared Redis cache with TTL
/// - [`crate::infrastructure::cache::NullCache`] - no-op implementation
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the destination for a short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` on a live (non-expired) entry
    /// - `Ok(None)` on miss, expiry, or backend error
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>>;

    /// Stores a destination, overwriting any existing entry and restarting its TTL.
    ///
    /// `ttl_seconds` overrides the implementation default when given. Backends
    /// that use a single fixed TTL ignore it.
    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Snapshots the invalidation state of `short_code`.
    ///
    /// Take it before reading the store; a later [`invalidate`](CacheService::invalidate)
    /// or [`invalidate_all`](CacheService::invalidate_all) makes it stale.
    async fn generation(&self, short_code: &str) -> CacheResult<Generation>;

    /// Stores a destination only if `short_code` has not been invalidated since
    /// `observed` was taken.
    ///
    /// Returns `Ok(false)` when the write was skipped.
    async fn set_url_if_current(
        &self,
        short_code: &str,
        original_url: &str,
        ttl_seconds: Option<u64>,
        observed: Generation,
    ) -> CacheResult<bool>;

    /// Removes a cached destination. Must be called when a mapping is deleted.
    async fn invalidate(&self, short_code: &str) -> CacheResult<()>;

    /// Removes every cached destination.
    async fn invalidate_all(&self) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;

    /// Short backend name for health reports and logs.
    fn backend_name(&self) -> &'static str;
}
