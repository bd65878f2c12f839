//! Infrastructure layer: persistence, key/value caching, listing read cache.

pub mod cache;
pub mod read_cache;
pub mod store;

pub use cache::{CacheError, InMemoryCache, KeyValueCache};
pub use read_cache::{CATEGORY_LIST_KEY, CatalogReadCache, DetailPageCache, PRODUCT_LIST_KEY};
pub use store::{CatalogStore, InMemoryCatalogStore, PostgresCatalogStore, ProductEditOutcome, StoreError};
