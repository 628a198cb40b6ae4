//! Mapping repository implementations.
//!
//! Concrete implementations of [`crate::domain::repositories::MappingRepository`].
//!
//! # Repositories
//!
//! - [`PgMappingRepository`] - PostgreSQL, the durable default
//! - [`MemoryMappingRepository`] - in-process map for development and tests

pub mod memory_mapping_repository;
pub mod pg_mapping_repository;

pub use memory_mapping_repository::MemoryMappingRepository;
pub use pg_mapping_repository::PgMappingRepository;
