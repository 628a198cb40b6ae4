//! Short code resolution for the redirect path.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::domain::repositories::MappingRepository;
use crate::domain::visit_event::VisitEvent;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::metrics;
use crate::utils::code_generator::is_valid_code;

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub short_code: String,
    pub original_url: String,
    pub cache_hit: bool,
}

/// Snapshot of the visit queue for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitQueueStatus {
    pub capacity: usize,
    pub pending: usize,
    pub closed: bool,
}

/// Resolves short codes to destinations and counts every resolution.
///
/// A cache hit serves the destination immediately and hands the increment to
/// the visit worker. A miss goes to the store, which looks up and increments
/// in one atomic step, then populates the cache unless the code was
/// invalidated while the store was being read. The cache itself never counts.
pub struct RedirectService<R: MappingRepository + ?Sized> {
    repository: Arc<R>,
    cache: Arc<dyn CacheService>,
    visit_tx: mpsc::Sender<VisitEvent>,
    store_timeout: Duration,
}

impl<R: MappingRepository + ?Sized> RedirectService<R> {
    pub fn new(
        repository: Arc<R>,
        cache: Arc<dyn CacheService>,
        visit_tx: mpsc::Sender<VisitEvent>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            cache,
            visit_tx,
            store_timeout,
        }
    }

    /// Resolves `short_code` to its destination, counting the visit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is malformed or unknown.
    /// Returns [`AppError::Internal`] if the store fails or does not answer
    /// within the configured timeout; no redirect is served in that case.
    pub async fn resolve(&self, short_code: &str) -> Result<Resolved, AppError> {
        if !is_valid_code(short_code) {
            return Err(not_found(short_code));
        }

        match self.cache.get_url(short_code).await {
            Ok(Some(original_url)) => {
                debug!(short_code, "Redirect served from cache");
                self.queue_visit(short_code).await?;
                metrics::redirect(true);
                return Ok(Resolved {
                    short_code: short_code.to_string(),
                    original_url,
                    cache_hit: true,
                });
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, short_code, "Cache lookup failed, using store"),
        }

        // Taken before the store read so a delete that lands in between keeps
        // this resolve from repopulating the cache.
        let generation = match self.cache.generation(short_code).await {
            Ok(generation) => Some(generation),
            Err(e) => {
                warn!(error = %e, short_code, "Cache generation unavailable, not caching");
                None
            }
        };

        let mapping = tokio::time::timeout(
            self.store_timeout,
            self.repository.find_and_increment(short_code),
        )
        .await
        .map_err(|_| {
            error!(
                short_code,
                timeout_ms = self.store_timeout.as_millis() as u64,
                "Store lookup timed out"
            );
            AppError::internal("Storage timeout", json!({}))
        })??
        .ok_or_else(|| not_found(short_code))?;

        if let Some(generation) = generation {
            match self
                .cache
                .set_url_if_current(&mapping.short_code, &mapping.original_url, None, generation)
                .await
            {
                Ok(true) => {}
                Ok(false) => debug!(short_code, "Invalidated during lookup, not caching"),
                Err(e) => warn!(error = %e, short_code, "Failed to cache destination"),
            }
        }

        metrics::redirect(false);
        Ok(Resolved {
            short_code: mapping.short_code,
            original_url: mapping.original_url,
            cache_hit: false,
        })
    }

    /// Hands a cache-hit visit to the worker.
    ///
    /// Waits for queue capacity rather than dropping. If the worker is gone
    /// (shutdown in progress) the increment is applied inline.
    async fn queue_visit(&self, short_code: &str) -> Result<(), AppError> {
        let Err(mpsc::error::SendError(event)) =
            self.visit_tx.send(VisitEvent::new(short_code)).await
        else {
            return Ok(());
        };

        warn!(short_code = %event.short_code, "Visit queue closed, counting inline");
        let found = tokio::time::timeout(
            self.store_timeout,
            self.repository.increment_visits(&event.short_code),
        )
        .await
        .map_err(|_| AppError::internal("Storage timeout", json!({})))??;

        if !found {
            if let Err(e) = self.cache.invalidate(short_code).await {
                warn!(error = %e, short_code, "Failed to evict stale cache entry");
            }
            return Err(not_found(short_code));
        }

        Ok(())
    }

    /// Current visit queue occupancy.
    pub fn queue_status(&self) -> VisitQueueStatus {
        let capacity = self.visit_tx.max_capacity();
        VisitQueueStatus {
            capacity,
            pending: capacity - self.visit_tx.capacity(),
            closed: self.visit_tx.is_closed(),
        }
    }

    /// Reports whether the cache backend answers.
    pub async fn cache_healthy(&self) -> bool {
        self.cache.health_check().await
    }

    /// Name of the configured cache backend.
    pub fn cache_backend(&self) -> &'static str {
        self.cache.backend_name()
    }
}

fn not_found(short_code: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "short_code": short_code }))
}
