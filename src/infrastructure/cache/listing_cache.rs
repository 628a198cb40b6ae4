//! Short-lived cache over the full admin listing.

use crate::domain::entities::UrlMapping;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Caches the complete mapping listing for a few seconds.
///
/// The admin listing is read far more often than mappings change, and visit
/// counts may lag by at most the TTL. Any create or delete calls
/// [`invalidate`](ListingCache::invalidate).
#[derive(Debug, Clone)]
pub struct ListingCache {
    cache: Cache<(), Arc<Vec<UrlMapping>>>,
}

impl ListingCache {
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { cache }
    }

    pub async fn get(&self) -> Option<Arc<Vec<UrlMapping>>> {
        self.cache.get(&()).await
    }

    pub async fn set(&self, mappings: Arc<Vec<UrlMapping>>) {
        self.cache.insert((), mappings).await;
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate(&()).await;
    }
}
