//! Background worker applying queued visit increments to the store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

use crate::domain::repositories::MappingRepository;
use crate::domain::visit_event::VisitEvent;
use crate::infrastructure::cache::CacheService;
use crate::metrics;

/// Retries after the first failed increment.
const MAX_RETRIES: usize = 3;

/// Consumes visit events until every sender is dropped.
///
/// Up to `concurrency` increments run at once. Each one is retried with
/// exponential backoff; if the mapping no longer exists the cached destination
/// is evicted so the next request goes back to the store. Events still queued
/// when the channel closes are drained before the worker returns.
pub async fn run_visit_worker(
    mut rx: mpsc::Receiver<VisitEvent>,
    repository: Arc<dyn MappingRepository>,
    cache: Arc<dyn CacheService>,
    concurrency: usize,
) {
    let limiter = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = limiter.clone().acquire_owned().await else {
            break;
        };

        let repository = repository.clone();
        let cache = cache.clone();
        in_flight.spawn(async move {
            let _permit = permit;
            record_visit(&event, repository.as_ref(), cache.as_ref()).await;
        });

        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}

    info!("Visit worker stopped");
}

/// Applies a single visit increment with retry.
async fn record_visit(
    event: &VisitEvent,
    repository: &dyn MappingRepository,
    cache: &dyn CacheService,
) {
    let code = event.short_code.as_str();
    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(MAX_RETRIES);

    match Retry::start(strategy, move || repository.increment_visits(code)).await {
        Ok(true) => {
            debug!(short_code = code, "Visit recorded");
        }
        Ok(false) => {
            warn!(short_code = code, "Visit for a mapping that no longer exists");
            if let Err(e) = cache.invalidate(code).await {
                warn!(error = %e, short_code = code, "Failed to evict stale cache entry");
            }
        }
        Err(e) => {
            metrics::visit_increment_failed();
            error!(
                error = %e,
                short_code = code,
                occurred_at = %event.occurred_at,
                "Failed to record visit after retries"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NewMapping;
    use crate::domain::repositories::MockMappingRepository;
    use crate::error::AppError;
    use crate::infrastructure::cache::MemoryCache;
    use crate::infrastructure::persistence::MemoryMappingRepository;
    use serde_json::json;

    async fn seeded_repository(code: &str) -> Arc<MemoryMappingRepository> {
        let repository = Arc::new(MemoryMappingRepository::new());
        repository
            .insert(NewMapping {
                short_code: code.to_string(),
                original_url: "https://example.com/".to_string(),
            })
            .await
            .unwrap();
        repository
    }

    #[tokio::test]
    async fn test_worker_applies_every_event_before_exit() {
        let repository = seeded_repository("abc123").await;
        let cache: Arc<dyn CacheService> =
            Arc::new(MemoryCache::new(100, Duration::from_secs(60)));
        let (tx, rx) = mpsc::channel(16);

        let worker = tokio::spawn(run_visit_worker(rx, repository.clone(), cache, 4));

        for _ in 0..25 {
            tx.send(VisitEvent::new("abc123")).await.unwrap();
        }
        drop(tx);
        worker.await.unwrap();

        let mapping = repository.find_by_code("abc123").await.unwrap().unwrap();
        assert_eq!(mapping.visits, 25);
    }

    #[tokio::test]
    async fn test_worker_evicts_cache_for_missing_mapping() {
        let repository = Arc::new(MemoryMappingRepository::new());
        let cache = Arc::new(MemoryCache::new(100, Duration::from_secs(60)));
        cache.set_url("gone12", "https://example.com/", None).await.unwrap();

        let (tx, rx) = mpsc::channel(4);
        let worker = tokio::spawn(run_visit_worker(rx, repository, cache.clone(), 1));

        tx.send(VisitEvent::new("gone12")).await.unwrap();
        drop(tx);
        worker.await.unwrap();

        assert!(cache.get_url("gone12").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_worker_retries_transient_failures() {
        let mut mock_repo = MockMappingRepository::new();
        let mut seq = mockall::Sequence::new();

        mock_repo
            .expect_increment_visits()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));
        mock_repo
            .expect_increment_visits()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));

        let cache: Arc<dyn CacheService> =
            Arc::new(MemoryCache::new(10, Duration::from_secs(60)));
        let (tx, rx) = mpsc::channel(1);
        let worker = tokio::spawn(run_visit_worker(rx, Arc::new(mock_repo), cache, 1));

        tx.send(VisitEvent::new("abc123")).await.unwrap();
        drop(tx);
        worker.await.unwrap();
    }
}
