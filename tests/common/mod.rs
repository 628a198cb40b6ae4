#![allow(dead_code)]

use axum::Router;
use axum_test::TestServer;
use shrtn::application::services::{AuthService, LinkService, RedirectService, hash_password};
use shrtn::domain::repositories::MappingRepository;
use shrtn::domain::visit_worker::run_visit_worker;
use shrtn::infrastructure::cache::{CacheService, MemoryCache};
use shrtn::infrastructure::persistence::MemoryMappingRepository;
use shrtn::routes::{RateLimiting, router};
use shrtn::state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";
pub const BASE_URL: &str = "https://sho.rt";

/// An in-process service wired like production, on the memory store.
pub struct TestApp {
    pub state: AppState,
    pub repository: Arc<MemoryMappingRepository>,
    pub cache: Arc<MemoryCache>,
}

pub fn create_test_app() -> TestApp {
    create_test_app_with_base_url(Some(BASE_URL))
}

pub fn create_test_app_with_base_url(base_url: Option<&str>) -> TestApp {
    let repository = Arc::new(MemoryMappingRepository::new());
    let cache = Arc::new(MemoryCache::new(1_000, Duration::from_secs(300)));

    let store: Arc<dyn MappingRepository> = repository.clone();
    let shared_cache: Arc<dyn CacheService> = cache.clone();

    let (visit_tx, visit_rx) = mpsc::channel(100);
    tokio::spawn(run_visit_worker(
        visit_rx,
        store.clone(),
        shared_cache.clone(),
        2,
    ));

    let link_service = Arc::new(LinkService::new(
        store.clone(),
        shared_cache.clone(),
        Duration::from_secs(10),
        6,
    ));
    let redirect_service = Arc::new(RedirectService::new(
        store,
        shared_cache,
        visit_tx,
        Duration::from_secs(5),
    ));
    let auth_service = Arc::new(AuthService::new(
        SIGNING_SECRET.to_string(),
        Some(hash_password(SIGNING_SECRET, ADMIN_PASSWORD)),
        Duration::from_secs(3600),
    ));

    let state = AppState::new(
        link_service,
        redirect_service,
        auth_service,
        base_url.map(str::to_string),
    );

    TestApp {
        state,
        repository,
        cache,
    }
}

impl TestApp {
    pub fn router(&self) -> Router {
        router(self.state.clone(), RateLimiting::Disabled)
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).unwrap()
    }

    /// Waits until the visit worker has brought `code` to `expected` visits.
    pub async fn wait_for_visits(&self, code: &str, expected: i64) {
        for _ in 0..200 {
            let visits = self
                .repository
                .find_by_code(code)
                .await
                .unwrap()
                .map(|m| m.visits);
            if visits == Some(expected) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let actual = self.repository.find_by_code(code).await.unwrap();
        panic!("visits for {code} never reached {expected}: {actual:?}");
    }
}

/// Creates a short link through the API and returns its code.
pub async fn shorten(server: &TestServer, url: &str) -> String {
    let response = server
        .post("/api/shorten")
        .json(&serde_json::json!({ "original_url": url }))
        .await;

    response.assert_status_ok();

    response.json::<serde_json::Value>()["short_code"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Logs in as admin and returns the bearer token.
pub async fn admin_token(server: &TestServer) -> String {
    let response = server
        .post("/api/admin/login")
        .json(&serde_json::json!({ "password": ADMIN_PASSWORD }))
        .await;

    response.assert_status_ok();

    response.json::<serde_json::Value>()["token"]
        .as_str()
        .unwrap()
        .to_string()
}
