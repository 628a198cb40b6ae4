//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and caching.
//!
//! # Modules
//!
//! - [`cache`] - Redirect and listing caches (Moka, Redis, no-op)
//! - [`persistence`] - PostgreSQL and in-memory mapping repositories

pub mod cache;
pub mod persistence;
