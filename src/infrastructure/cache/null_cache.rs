//! No-op cache implementation for disabled caching.

use super::service::{CacheResult, CacheService, Generation};
use async_trait::async_trait;
use tracing::debug;

/// A cache implementation that stores nothing.
///
/// Selected with `CACHE_BACKEND=none`, and used as the fallback when the Redis
/// backend cannot be reached at startup. Every lookup is a miss, so each
/// redirect goes to the store and is counted there.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_url(&self, _short_code: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set_url(
        &self,
        _short_code: &str,
        _original_url: &str,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        Ok(())
    }

    async fn generation(&self, _short_code: &str) -> CacheResult<Generation> {
        Ok(Generation::default())
    }

    async fn set_url_if_current(
        &self,
        _short_code: &str,
        _original_url: &str,
        _ttl_seconds: Option<u64>,
        _observed: Generation,
    ) -> CacheResult<bool> {
        Ok(false)
    }

    async fn invalidate(&self, _short_code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate_all(&self) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "none"
    }
}
