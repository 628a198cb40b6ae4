//! Repository trait for short code mappings.

use crate::domain::entities::{NewMapping, UrlMapping};
use crate::error::AppError;
use async_trait::async_trait;

/// Storage interface for [`UrlMapping`] records.
///
/// Implementations must enforce `short_code` uniqueness themselves and make
/// [`find_and_increment`](MappingRepository::find_and_increment) and
/// [`increment_visits`](MappingRepository::increment_visits) atomic
/// read-modify-write operations. No lock is taken above this trait.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMappingRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryMappingRepository`] - in-process map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Inserts a new mapping.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code is already taken.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn insert(&self, new_mapping: NewMapping) -> Result<UrlMapping, AppError>;

    /// Looks up a mapping and, if present, increments `visits` and refreshes
    /// `updated_at` in the same operation.
    ///
    /// Returns the mapping as it is after the increment.
    async fn find_and_increment(&self, short_code: &str) -> Result<Option<UrlMapping>, AppError>;

    /// Increments `visits` for an existing mapping.
    ///
    /// Returns `Ok(false)` if no mapping has this code.
    async fn increment_visits(&self, short_code: &str) -> Result<bool, AppError>;

    /// Looks up a mapping without side effects.
    async fn find_by_code(&self, short_code: &str) -> Result<Option<UrlMapping>, AppError>;

    /// Deletes one mapping and returns the number of removed records (0 or 1).
    async fn delete(&self, short_code: &str) -> Result<u64, AppError>;

    /// Deletes every mapping and returns how many were removed.
    async fn delete_all(&self) -> Result<u64, AppError>;

    /// Lists all mappings, newest first.
    async fn list(&self) -> Result<Vec<UrlMapping>, AppError>;

    /// Counts all mappings.
    async fn count(&self) -> Result<i64, AppError>;
}
