//! Persistence collaborator for the catalog.
//!
//! Every operation that touches a product's version history runs inside a
//! per-product critical section (a write lock in memory, a row lock in
//! Postgres), so demotion, promotion and persistence are one unit.

use async_trait::async_trait;
use thiserror::Error;

use storefront_catalog::{Category, Product, ProductFilter, Version, VersionBatch, VersionDraft, sort_for_listing};
use storefront_core::{CategoryId, DomainError, ProductId, VersionId};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Domain failure raised inside the store's critical section
    /// (not found, constraint violation, ledger invariant).
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found() -> Self {
        Self::Domain(DomainError::NotFound)
    }
}

/// Result of committing a product edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductEditOutcome {
    pub product: Product,
    /// Versions saved by the edit, in submission order.
    pub saved_versions: Vec<Version>,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_category(&self, category: Category) -> Result<Category, StoreError>;

    async fn find_category(&self, id: CategoryId) -> Result<Category, StoreError>;

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn find_product(&self, id: ProductId) -> Result<Product, StoreError>;

    /// All products in listing order.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    async fn filter_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        let mut products = self.list_products().await?;
        products.retain(|p| filter.matches(p));
        sort_for_listing(&mut products);
        Ok(products)
    }

    /// Insert a new product; its category must exist.
    async fn insert_product(&self, product: Product) -> Result<Product, StoreError>;

    /// Atomically increment `views_counter` and return the updated product.
    async fn record_view(&self, id: ProductId) -> Result<Product, StoreError>;

    /// Persist an edited product together with its version sub-form.
    ///
    /// All-or-nothing. `views_counter`, `owner` and `created_at` are taken from
    /// the stored record, not from `product`.
    async fn commit_product_edit(&self, product: Product, batch: VersionBatch) -> Result<ProductEditOutcome, StoreError>;

    /// Delete a product; its versions survive with `product_id = None`.
    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError>;

    async fn find_version(&self, id: VersionId) -> Result<Version, StoreError>;

    /// Versions in default order; `None` lists every version.
    async fn list_versions(&self, product_id: Option<ProductId>) -> Result<Vec<Version>, StoreError>;

    async fn active_version(&self, product_id: ProductId) -> Result<Option<Version>, StoreError>;

    /// Save one version through the ledger (it becomes current).
    async fn save_version(&self, draft: VersionDraft) -> Result<Version, StoreError>;

    async fn delete_version(&self, id: VersionId) -> Result<Version, StoreError>;
}

/// Field error used when a product references a category that does not exist.
pub(crate) fn unknown_category() -> StoreError {
    StoreError::Domain(DomainError::validation(
        "category_id",
        "select a valid choice; that category does not exist",
    ))
}
