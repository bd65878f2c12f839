//! Catalog read cache: read-through caching for listing queries and the
//! product detail page.
//!
//! Listings are cached under fixed keys with no expiry and are never
//! invalidated on writes; a stale snapshot is served until the cache is
//! flushed or disabled. Cache backend failures are logged and the request
//! falls through to the store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use storefront_catalog::{Category, Product};
use storefront_core::ProductId;

use crate::cache::KeyValueCache;
use crate::store::{CatalogStore, StoreError};

pub const PRODUCT_LIST_KEY: &str = "product_list";
pub const CATEGORY_LIST_KEY: &str = "categories_list";

#[derive(Clone)]
pub struct CatalogReadCache {
    enabled: bool,
    cache: Arc<dyn KeyValueCache>,
}

impl CatalogReadCache {
    pub fn new(enabled: bool, cache: Arc<dyn KeyValueCache>) -> Self {
        Self { enabled, cache }
    }

    pub async fn list_products(&self, store: &dyn CatalogStore) -> Result<Vec<Product>, StoreError> {
        self.read_through(PRODUCT_LIST_KEY, || store.list_products()).await
    }

    pub async fn list_categories(&self, store: &dyn CatalogStore) -> Result<Vec<Category>, StoreError> {
        self.read_through(CATEGORY_LIST_KEY, || store.list_categories()).await
    }

    async fn read_through<T, F, Fut>(&self, key: &str, load: F) -> Result<T, StoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        if !self.enabled {
            return load().await;
        }

        match self.cache.get(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    tracing::debug!(key, "listing cache hit");
                    return Ok(value);
                }
                Err(e) => tracing::warn!(key, error = %e, "discarding undecodable cache entry"),
            },
            Ok(None) => tracing::debug!(key, "listing cache miss"),
            Err(e) => tracing::warn!(key, error = %e, "cache read failed; using store"),
        }

        let value = load().await?;
        match serde_json::to_string(&value) {
            Ok(raw) => {
                if let Err(e) = self.cache.set(key, raw) {
                    tracing::warn!(key, error = %e, "cache write failed");
                }
            }
            Err(e) => tracing::warn!(key, error = %e, "failed to encode listing for cache"),
        }
        Ok(value)
    }
}

/// Per-product cache of the rendered detail page, with a fixed TTL.
#[derive(Clone)]
pub struct DetailPageCache {
    enabled: bool,
    ttl: Duration,
    cache: Arc<dyn KeyValueCache>,
}

impl DetailPageCache {
    pub fn new(enabled: bool, ttl: Duration, cache: Arc<dyn KeyValueCache>) -> Self {
        Self { enabled, ttl, cache }
    }

    fn key(id: ProductId) -> String {
        format!("product_detail:{id}")
    }

    pub fn get<T: DeserializeOwned>(&self, id: ProductId) -> Option<T> {
        if !self.enabled {
            return None;
        }
        match self.cache.get(&Self::key(id)) {
            Ok(Some(raw)) => serde_json::from_str(&raw)
                .map_err(|e| tracing::warn!(product_id = %id, error = %e, "discarding undecodable detail page"))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(product_id = %id, error = %e, "detail cache read failed");
                None
            }
        }
    }

    pub fn put<T: Serialize>(&self, id: ProductId, page: &T) {
        if !self.enabled {
            return;
        }
        let raw = match serde_json::to_string(page) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(product_id = %id, error = %e, "failed to encode detail page");
                return;
            }
        };
        if let Err(e) = self.cache.set_with_ttl(&Self::key(id), raw, self.ttl) {
            tracing::warn!(product_id = %id, error = %e, "detail cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use storefront_catalog::{CategoryForm, ProductForm, Version, VersionBatch, VersionDraft};
    use storefront_core::{CategoryId, UserId, VersionId};

    use super::*;
    use crate::cache::{CacheError, InMemoryCache};
    use crate::store::{InMemoryCatalogStore, ProductEditOutcome};

    /// Wraps the in-memory store and counts listing queries.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryCatalogStore,
        product_lists: AtomicUsize,
        category_lists: AtomicUsize,
    }

    #[async_trait]
    impl CatalogStore for CountingStore {
        async fn insert_category(&self, category: Category) -> Result<Category, StoreError> {
            self.inner.insert_category(category).await
        }
        async fn find_category(&self, id: CategoryId) -> Result<Category, StoreError> {
            self.inner.find_category(id).await
        }
        async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
            self.category_lists.fetch_add(1, Ordering::SeqCst);
            self.inner.list_categories().await
        }
        async fn find_product(&self, id: ProductId) -> Result<Product, StoreError> {
            self.inner.find_product(id).await
        }
        async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
            self.product_lists.fetch_add(1, Ordering::SeqCst);
            self.inner.list_products().await
        }
        async fn insert_product(&self, product: Product) -> Result<Product, StoreError> {
            self.inner.insert_product(product).await
        }
        async fn record_view(&self, id: ProductId) -> Result<Product, StoreError> {
            self.inner.record_view(id).await
        }
        async fn commit_product_edit(&self, product: Product, batch: VersionBatch) -> Result<ProductEditOutcome, StoreError> {
            self.inner.commit_product_edit(product, batch).await
        }
        async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
            self.inner.delete_product(id).await
        }
        async fn find_version(&self, id: VersionId) -> Result<Version, StoreError> {
            self.inner.find_version(id).await
        }
        async fn list_versions(&self, product_id: Option<ProductId>) -> Result<Vec<Version>, StoreError> {
            self.inner.list_versions(product_id).await
        }
        async fn active_version(&self, product_id: ProductId) -> Result<Option<Version>, StoreError> {
            self.inner.active_version(product_id).await
        }
        async fn save_version(&self, draft: VersionDraft) -> Result<Version, StoreError> {
            self.inner.save_version(draft).await
        }
        async fn delete_version(&self, id: VersionId) -> Result<Version, StoreError> {
            self.inner.delete_version(id).await
        }
    }

    struct BrokenCache;

    impl KeyValueCache for BrokenCache {
        fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Backend("down".to_string()))
        }
        fn set(&self, _key: &str, _value: String) -> Result<(), CacheError> {
            Err(CacheError::Backend("down".to_string()))
        }
        fn set_with_ttl(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Backend("down".to_string()))
        }
    }

    async fn seeded_store() -> CountingStore {
        let store = CountingStore::default();
        let category = Category::create(
            CategoryId::new(),
            CategoryForm {
                name: "Books".to_string(),
                description: "Paper".to_string(),
            },
        )
        .unwrap();
        store.insert_category(category.clone()).await.unwrap();
        add_product(&store, category.id, "Dune").await;
        store
    }

    async fn add_product(store: &CountingStore, category_id: CategoryId, name: &str) {
        let form = ProductForm {
            name: name.to_string(),
            description: "Novel".to_string(),
            image: None,
            category_id,
            price: Decimal::new(1_000, 2),
            is_published: true,
        };
        let product = Product::create(ProductId::new(), form, UserId::new(), Utc::now()).unwrap();
        store.insert_product(product).await.unwrap();
    }

    #[tokio::test]
    async fn disabled_cache_always_queries_the_store() {
        let store = seeded_store().await;
        let cache = Arc::new(InMemoryCache::new());
        let read_cache = CatalogReadCache::new(false, cache.clone());

        read_cache.list_products(&store).await.unwrap();
        read_cache.list_products(&store).await.unwrap();

        assert_eq!(store.product_lists.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get(PRODUCT_LIST_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn enabled_cache_serves_stale_snapshot() {
        let store = seeded_store().await;
        let read_cache = CatalogReadCache::new(true, Arc::new(InMemoryCache::new()));

        let first = read_cache.list_products(&store).await.unwrap();
        let category_id = first[0].category_id;
        add_product(&store, category_id, "Emma").await;
        let second = read_cache.list_products(&store).await.unwrap();

        assert_eq!(store.product_lists.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn categories_use_their_own_key() {
        let store = seeded_store().await;
        let cache = Arc::new(InMemoryCache::new());
        let read_cache = CatalogReadCache::new(true, cache.clone());

        read_cache.list_categories(&store).await.unwrap();
        read_cache.list_categories(&store).await.unwrap();

        assert_eq!(store.category_lists.load(Ordering::SeqCst), 1);
        assert!(cache.get(CATEGORY_LIST_KEY).unwrap().is_some());
        assert_eq!(cache.get(PRODUCT_LIST_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn broken_backend_falls_back_to_store() {
        let store = seeded_store().await;
        let read_cache = CatalogReadCache::new(true, Arc::new(BrokenCache));

        let products = read_cache.list_products(&store).await.unwrap();
        read_cache.list_products(&store).await.unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(store.product_lists.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn undecodable_entry_is_reloaded() {
        let store = seeded_store().await;
        let cache = Arc::new(InMemoryCache::new());
        cache.set(PRODUCT_LIST_KEY, "not json".to_string()).unwrap();
        let read_cache = CatalogReadCache::new(true, cache);

        let products = read_cache.list_products(&store).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(store.product_lists.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn detail_cache_round_trips_when_enabled() {
        let id = ProductId::new();
        let pages = DetailPageCache::new(true, Duration::from_secs(60), Arc::new(InMemoryCache::new()));
        assert_eq!(pages.get::<String>(id), None);
        pages.put(id, &"rendered".to_string());
        assert_eq!(pages.get::<String>(id).as_deref(), Some("rendered"));
    }

    #[test]
    fn detail_cache_is_inert_when_disabled() {
        let id = ProductId::new();
        let cache = Arc::new(InMemoryCache::new());
        let pages = DetailPageCache::new(false, Duration::from_secs(60), cache.clone());
        pages.put(id, &"rendered".to_string());
        assert_eq!(pages.get::<String>(id), None);
        assert_eq!(cache.get(&format!("product_detail:{id}")).unwrap(), None);
    }
}
