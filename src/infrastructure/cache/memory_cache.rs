//! In-process cache backed by Moka.

use super::service::{CacheResult, CacheService, Generation};
use async_trait::async_trait;
use dashmap::DashMap;
use moka::future::Cache;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// A cached destination with its insertion time and the epoch it was read at.
#[derive(Debug, Clone)]
struct CachedUrl {
    original_url: String,
    cached_at: Instant,
    epoch: u64,
}

/// Invalidation bookkeeping.
///
/// Every invalidation advances `epoch`. `invalidated` keeps the epoch of the
/// last per-code invalidation and `cleared` the epoch of the last full clear.
/// An entry stored with an older epoch is stale, which is checked both when
/// storing and when reading so a write racing an invalidation never surfaces.
#[derive(Debug, Default)]
struct Epochs {
    epoch: AtomicU64,
    cleared: AtomicU64,
    invalidated: DashMap<String, u64>,
}

impl Epochs {
    fn current(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn advance(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_stale(&self, short_code: &str, epoch: u64) -> bool {
        epoch < self.cleared.load(Ordering::SeqCst)
            || self
                .invalidated
                .get(short_code)
                .is_some_and(|invalidated| *invalidated > epoch)
    }
}

/// Process-local redirect cache with a fixed TTL and a capacity bound.
///
/// Entries expire `ttl` after insertion (overwrites restart the clock). Once
/// `max_capacity` entries are held, Moka evicts the least valuable ones, so
/// memory stays bounded under high short-code cardinality. Contents are lost
/// on restart and are not shared between processes.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    cache: Cache<String, CachedUrl>,
    epochs: Arc<Epochs>,
    ttl: Duration,
}

impl MemoryCache {
    /// Creates a cache holding at most `max_capacity` entries for `ttl` each.
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        debug!(max_capacity, ttl_secs = ttl.as_secs_f64(), "Using in-memory cache");

        Self {
            cache,
            epochs: Arc::new(Epochs::default()),
            ttl,
        }
    }

    /// Returns the configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Applies pending evictions and expirations.
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }

    async fn store(&self, short_code: &str, original_url: &str, epoch: u64) {
        let entry = CachedUrl {
            original_url: original_url.to_string(),
            cached_at: Instant::now(),
            epoch,
        };
        self.cache.insert(short_code.to_string(), entry).await;
        trace!(short_code, epoch, "Cache SET");
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        match self.cache.get(short_code).await {
            Some(entry) if self.epochs.is_stale(short_code, entry.epoch) => {
                self.cache.invalidate(short_code).await;
                trace!(short_code, "Cache MISS (stale entry dropped)");
                Ok(None)
            }
            Some(entry) => {
                trace!(
                    short_code,
                    age_ms = entry.cached_at.elapsed().as_millis() as u64,
                    "Cache HIT"
                );
                Ok(Some(entry.original_url))
            }
            None => {
                trace!(short_code, "Cache MISS");
                Ok(None)
            }
        }
    }

    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        self.store(short_code, original_url, self.epochs.current()).await;
        Ok(())
    }

    async fn generation(&self, _short_code: &str) -> CacheResult<Generation> {
        Ok(Generation {
            epoch: self.epochs.current(),
            code: 0,
        })
    }

    async fn set_url_if_current(
        &self,
        short_code: &str,
        original_url: &str,
        _ttl_seconds: Option<u64>,
        observed: Generation,
    ) -> CacheResult<bool> {
        if self.epochs.is_stale(short_code, observed.epoch) {
            trace!(short_code, "Cache SET skipped, invalidated since read");
            return Ok(false);
        }
        self.store(short_code, original_url, observed.epoch).await;
        Ok(true)
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        let epoch = self.epochs.advance();
        self.epochs.invalidated.insert(short_code.to_string(), epoch);
        self.cache.invalidate(short_code).await;
        debug!(short_code, epoch, "Cache INVALIDATE");
        Ok(())
    }

    async fn invalidate_all(&self) -> CacheResult<()> {
        let epoch = self.epochs.advance();
        self.epochs.cleared.store(epoch, Ordering::SeqCst);
        self.epochs.invalidated.clear();
        self.cache.invalidate_all();
        debug!(epoch, "Cache INVALIDATE ALL");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
