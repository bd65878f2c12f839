//! Generic key/value cache collaborator.
//!
//! Values are opaque strings (callers serialize). The in-process cache is the
//! default; the Redis-backed cache is available behind the `redis` feature.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

pub mod in_memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use in_memory::InMemoryCache;
#[cfg(feature = "redis")]
pub use self::redis::RedisCache;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

pub trait KeyValueCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store without expiry.
    fn set(&self, key: &str, value: String) -> Result<(), CacheError>;

    fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
}

impl<C> KeyValueCache for Arc<C>
where
    C: KeyValueCache + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        (**self).set(key, value)
    }

    fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        (**self).set_with_ttl(key, value, ttl)
    }
}
