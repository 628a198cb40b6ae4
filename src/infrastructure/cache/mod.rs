//! Caching layer for fast redirect lookups.
//!
//! Provides a [`CacheService`] trait with three implementations:
//! - [`MemoryCache`] - In-process Moka cache with TTL and capacity bound (default)
//! - [`RedisCache`] - Shared Redis-backed cache
//! - [`NullCache`] - No-op implementation for disabled caching
//!
//! [`ListingCache`] is a separate, coarser cache over the admin listing.

mod listing_cache;
mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use listing_cache::ListingCache;
pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService, Generation};
