use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use super::{CacheError, KeyValueCache};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// In-process cache for tests/dev.
///
/// Expired entries are purged on every write, so keys of products that are
/// no longer viewed do not accumulate.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    inner: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every entry (manual flush).
    pub fn clear(&self) -> Result<(), CacheError> {
        self.inner
            .write()
            .map_err(|_| CacheError::Backend("lock poisoned".to_string()))?
            .clear();
        Ok(())
    }

    fn insert(&self, key: &str, value: String, expires_at: Option<Instant>) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut map = self
            .inner
            .write()
            .map_err(|_| CacheError::Backend("lock poisoned".to_string()))?;
        map.retain(|_, e| e.is_live(now));
        map.insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }
}

impl KeyValueCache for InMemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let map = self
            .inner
            .read()
            .map_err(|_| CacheError::Backend("lock poisoned".to_string()))?;
        Ok(map
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.insert(key, value, None)
    }

    fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.insert(key, value, Some(Instant::now() + ttl))
    }
}
