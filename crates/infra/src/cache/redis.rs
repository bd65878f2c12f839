//! Redis-backed cache (optional).
//!
//! Uses a fresh blocking connection per call, like the other Redis adapters
//! in this crate.

use std::time::Duration;

use redis::Commands;

use super::{CacheError, KeyValueCache};

#[derive(Debug, Clone)]
pub struct RedisCache {
    client: redis::Client,
    prefix: String,
}

impl RedisCache {
    pub fn new(redis_url: impl AsRef<str>, prefix: impl Into<String>) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url.as_ref()).map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(Self {
            client,
            prefix: prefix.into(),
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn connection(&self) -> Result<redis::Connection, CacheError> {
        self.client
            .get_connection()
            .map_err(|e| CacheError::Backend(e.to_string()))
    }
}

impl KeyValueCache for RedisCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection()?;
        conn.get(self.key(key))
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        let mut conn = self.connection()?;
        conn.set::<_, _, ()>(self.key(key), value)
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        // SETEX rejects a zero expiry; treat it as "do not cache".
        let seconds = ttl.as_secs();
        if seconds == 0 {
            return Ok(());
        }
        let mut conn = self.connection()?;
        conn.set_ex::<_, _, ()>(self.key(key), value, seconds)
            .map_err(|e| CacheError::Backend(e.to_string()))
    }
}
