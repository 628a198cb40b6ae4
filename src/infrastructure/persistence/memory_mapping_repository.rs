//! In-process mapping repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{NewMapping, UrlMapping};
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;

/// Mapping store held in a sharded concurrent map.
///
/// DashMap's per-shard locks make the check-and-insert in
/// [`insert`](MappingRepository::insert) and the read-modify-write in
/// [`find_and_increment`](MappingRepository::find_and_increment) atomic per
/// key. Data does not survive a restart.
#[derive(Debug)]
pub struct MemoryMappingRepository {
    storage: DashMap<String, UrlMapping>,
    next_id: AtomicI64,
}

impl MemoryMappingRepository {
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryMappingRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MappingRepository for MemoryMappingRepository {
    async fn insert(&self, new_mapping: NewMapping) -> Result<UrlMapping, AppError> {
        match self.storage.entry(new_mapping.short_code) {
            Entry::Occupied(entry) => Err(AppError::conflict(
                "Short code already exists",
                json!({ "short_code": entry.key() }),
            )),
            Entry::Vacant(entry) => {
                let now = Utc::now();
                let mapping = UrlMapping::new(
                    self.next_id.fetch_add(1, Ordering::Relaxed),
                    entry.key().clone(),
                    new_mapping.original_url,
                    0,
                    now,
                    now,
                );
                entry.insert(mapping.clone());
                Ok(mapping)
            }
        }
    }

    async fn find_and_increment(&self, short_code: &str) -> Result<Option<UrlMapping>, AppError> {
        let Some(mut mapping) = self.storage.get_mut(short_code) else {
            return Ok(None);
        };

        mapping.visits += 1;
        mapping.updated_at = Utc::now();

        Ok(Some(mapping.clone()))
    }

    async fn increment_visits(&self, short_code: &str) -> Result<bool, AppError> {
        Ok(self.find_and_increment(short_code).await?.is_some())
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<UrlMapping>, AppError> {
        Ok(self.storage.get(short_code).map(|m| m.clone()))
    }

    async fn delete(&self, short_code: &str) -> Result<u64, AppError> {
        Ok(u64::from(self.storage.remove(short_code).is_some()))
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let mut deleted = 0;
        self.storage.retain(|_, _| {
            deleted += 1;
            false
        });
        Ok(deleted)
    }

    async fn list(&self) -> Result<Vec<UrlMapping>, AppError> {
        let mut mappings: Vec<UrlMapping> = self.storage.iter().map(|m| m.clone()).collect();
        mappings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(mappings)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.storage.len() as i64)
    }
}
