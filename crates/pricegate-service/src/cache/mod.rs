//! Caching infrastructure for the service layer.
//!
//! [`CacheInterface`] abstracts the raw key/value store (Redis or an
//! in-process map). [`PredictionCache`] sits on top of it and turns every
//! store failure into a miss, so the cache can never fail a request.

mod cache_interface;
pub mod cache_keys;
mod memory_cache;
mod prediction_cache;
mod redis_cache;

pub use cache_interface::{CacheExt, CacheInterface};
pub use memory_cache::MemoryCacheService;
pub use prediction_cache::PredictionCache;
pub use redis_cache::{create_redis_pool, RedisCacheService};
