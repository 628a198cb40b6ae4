//! HTTP server initialization and runtime setup.
//!
//! Handles store and cache setup, worker spawning, and Axum server lifecycle.

use crate::application::services::{AuthService, LinkService, RedirectService};
use crate::config::{CacheBackend, Config, StorageBackend};
use crate::domain::repositories::MappingRepository;
use crate::domain::visit_worker::run_visit_worker;
use crate::infrastructure::cache::{CacheService, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::persistence::{MemoryMappingRepository, PgMappingRepository};
use crate::routes::{RateLimiting, app_router};
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;

/// Delay between startup connection attempts.
const CONNECT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Retries after the first failed startup connection.
const CONNECT_RETRIES: usize = 11;

/// How long to wait for queued visits to be written after the server stops.
const VISIT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Mapping store (PostgreSQL with migrations, or in-memory)
/// - Redirect cache (memory, Redis with NullCache fallback, or none)
/// - Background visit worker
/// - Axum HTTP server with graceful shutdown
///
/// On shutdown the router is dropped, which closes the visit queue, and the
/// worker is given time to drain what is left.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = build_repository(&config).await?;
    let cache = build_cache(&config).await;

    let (visit_tx, visit_rx) = mpsc::channel(config.visit_queue_capacity);
    let worker = tokio::spawn(run_visit_worker(
        visit_rx,
        repository.clone(),
        cache.clone(),
        config.visit_worker_concurrency,
    ));
    tracing::info!(
        concurrency = config.visit_worker_concurrency,
        "Visit worker started"
    );

    let link_service = Arc::new(LinkService::new(
        repository.clone(),
        cache.clone(),
        config.listing_cache_ttl(),
        config.short_code_length,
    ));
    let redirect_service = Arc::new(RedirectService::new(
        repository,
        cache,
        visit_tx,
        config.store_timeout(),
    ));
    let auth_service = Arc::new(AuthService::new(
        config.token_signing_secret.clone(),
        config.admin_password_hash.clone(),
        config.session_ttl(),
    ));

    let state = AppState::new(
        link_service,
        redirect_service,
        auth_service,
        config.base_url.clone(),
    );

    let app = app_router(
        state,
        RateLimiting::from_flags(config.rate_limit_enabled, config.behind_proxy),
    );

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address: {}", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped, draining visit queue");
    match tokio::time::timeout(VISIT_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Visit worker panicked"),
        Err(_) => tracing::warn!("Visit queue not drained before timeout"),
    }

    Ok(())
}

async fn build_repository(config: &Config) -> Result<Arc<dyn MappingRepository>> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, mappings are lost on restart");
            Ok(Arc::new(MemoryMappingRepository::new()))
        }
        StorageBackend::Postgres => {
            let pool = connect_postgres(config).await?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Migrations applied");

            Ok(Arc::new(PgMappingRepository::new(Arc::new(pool))))
        }
    }
}

/// Connects to PostgreSQL, retrying on a fixed interval while the database
/// comes up.
async fn connect_postgres(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set for postgres storage")?;

    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    let strategy = FixedInterval::new(CONNECT_RETRY_INTERVAL).take(CONNECT_RETRIES);

    let pool = Retry::start(strategy, || {
        let options = options.clone();
        async move {
            options.connect(database_url).await.inspect_err(|e| {
                tracing::warn!(
                    error = %e,
                    retry_in_secs = CONNECT_RETRY_INTERVAL.as_secs(),
                    "Database connection failed"
                );
            })
        }
    })
    .await
    .context("Failed to connect to database")?;

    tracing::info!("Connected to database");
    Ok(pool)
}

async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    match (config.cache_backend, config.redis_url.as_deref()) {
        (CacheBackend::Memory, _) => {
            tracing::info!("Cache enabled (memory)");
            Arc::new(MemoryCache::new(config.cache_max_entries, config.cache_ttl()))
        }
        (CacheBackend::Redis, Some(redis_url)) => {
            match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
                Ok(redis) => {
                    tracing::info!("Cache enabled (Redis)");
                    Arc::new(redis)
                }
                Err(e) => {
                    tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                    Arc::new(NullCache::new())
                }
            }
        }
        (CacheBackend::Redis, None) | (CacheBackend::None, _) => {
            tracing::info!("Cache disabled (NullCache)");
            Arc::new(NullCache::new())
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
