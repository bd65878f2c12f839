//! Catalog application service: the edit workflow and the read paths, on top
//! of the store and cache collaborators.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use storefront_auth::{Actor, AuthzError, EditCapability, can_delete, require_edit};
use storefront_catalog::{
    Category, CategoryForm, DecoratedProduct, Product, ProductFilter, ProductForm, Version, VersionBatch,
    VersionDraft, active_version_name, decorate_for_listing,
};
use storefront_core::{CategoryId, DomainError, ProductId, VersionId};
use storefront_infra::{
    CatalogReadCache, CatalogStore, DetailPageCache, InMemoryCache, InMemoryCatalogStore, KeyValueCache,
    PostgresCatalogStore, ProductEditOutcome, StoreError,
};

use crate::app::dto::{CreateVersionRequest, ProductDetail, UpdateProductRequest, UpdateVersionRequest};
use crate::config::AppConfig;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("authentication required")]
    Unauthenticated,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(e) => Self::Domain(e),
            StoreError::Backend(msg) => Self::Backend(msg),
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => Self::Unauthenticated,
            AuthzError::PermissionDenied => Self::Domain(DomainError::PermissionDenied),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    listings: CatalogReadCache,
    detail_pages: DetailPageCache,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, listings: CatalogReadCache, detail_pages: DetailPageCache) -> Self {
        Self {
            store,
            listings,
            detail_pages,
        }
    }

    // -------------------------
    // Products
    // -------------------------

    /// Listing with per-actor decoration. Unfiltered listings go through the
    /// read cache; filtered ones always hit the store.
    pub async fn list_products(&self, actor: Option<&Actor>, filter: &ProductFilter) -> ServiceResult<Vec<DecoratedProduct>> {
        let products = if filter.is_empty() {
            self.listings.list_products(self.store.as_ref()).await?
        } else {
            self.store.filter_products(filter).await?
        };

        let mut out = Vec::with_capacity(products.len());
        for product in products {
            let active = self.store.active_version(product.id).await?;
            out.push(decorate_for_listing(product, active.as_ref(), actor));
        }
        Ok(out)
    }

    /// Detail page. A fresh render records one view; a cached page does not.
    pub async fn product_detail(&self, id: ProductId) -> ServiceResult<ProductDetail> {
        if let Some(page) = self.detail_pages.get::<ProductDetail>(id) {
            tracing::debug!(product_id = %id, "detail page served from cache");
            return Ok(page);
        }

        let product = self.store.record_view(id).await?;
        let versions = self.store.list_versions(Some(id)).await?;
        let active_version_name = active_version_name(versions.iter().find(|v| v.is_current));
        let page = ProductDetail {
            product,
            versions,
            active_version_name,
        };

        self.detail_pages.put(id, &page);
        Ok(page)
    }

    pub async fn create_product(&self, actor: &Actor, form: ProductForm) -> ServiceResult<Product> {
        let product = Product::create(ProductId::new(), form, actor.id(), Utc::now())?;
        let product = self.store.insert_product(product).await?;
        tracing::info!(product_id = %product.id, owner = %actor.id(), "product created");
        Ok(product)
    }

    /// Edit workflow: fetch, resolve capability, validate the form bound for
    /// that capability, then commit the product and its version sub-form as
    /// one unit.
    pub async fn update_product(
        &self,
        actor: &Actor,
        id: ProductId,
        request: UpdateProductRequest,
    ) -> ServiceResult<ProductEditOutcome> {
        let mut product = self.store.find_product(id).await?;
        let capability = require_edit(actor, &product)?;
        let now = Utc::now();

        let batch = match capability {
            EditCapability::FullEdit => {
                let form = request.full_form()?;
                product.apply_full_edit(form, now)?;
                VersionBatch::from_entries(id, request.versions)?
            }
            EditCapability::ModeratedEdit => {
                product.apply_moderated_edit(request.moderator_form(), now)?;
                VersionBatch::default()
            }
            EditCapability::Denied => return Err(DomainError::PermissionDenied.into()),
        };

        let outcome = self.store.commit_product_edit(product, batch).await?;
        tracing::info!(
            product_id = %id,
            actor = %actor.id(),
            capability = ?capability,
            versions_saved = outcome.saved_versions.len(),
            "product updated"
        );
        Ok(outcome)
    }

    pub async fn delete_product(&self, actor: &Actor, id: ProductId) -> ServiceResult<()> {
        let product = self.store.find_product(id).await?;
        if !can_delete(actor, &product) {
            tracing::warn!(product_id = %id, actor = %actor.id(), "product delete denied");
            return Err(DomainError::PermissionDenied.into());
        }
        self.store.delete_product(id).await?;
        tracing::info!(product_id = %id, actor = %actor.id(), "product deleted");
        Ok(())
    }

    // -------------------------
    // Categories
    // -------------------------

    pub async fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.listings.list_categories(self.store.as_ref()).await?)
    }

    pub async fn get_category(&self, id: CategoryId) -> ServiceResult<Category> {
        Ok(self.store.find_category(id).await?)
    }

    /// Superusers only.
    pub async fn create_category(&self, actor: &Actor, form: CategoryForm) -> ServiceResult<Category> {
        if !actor.is_superuser() {
            tracing::warn!(actor = %actor.id(), "category create denied");
            return Err(DomainError::PermissionDenied.into());
        }
        let category = Category::create(CategoryId::new(), form)?;
        Ok(self.store.insert_category(category).await?)
    }

    // -------------------------
    // Versions (dormant routes)
    // -------------------------

    pub async fn list_versions(&self, product_id: Option<ProductId>) -> ServiceResult<Vec<Version>> {
        Ok(self.store.list_versions(product_id).await?)
    }

    pub async fn version_detail(&self, id: VersionId) -> ServiceResult<Version> {
        Ok(self.store.find_version(id).await?)
    }

    pub async fn create_version(&self, actor: &Actor, request: CreateVersionRequest) -> ServiceResult<Version> {
        self.require_full_edit(actor, request.product_id).await?;
        let draft = VersionDraft {
            id: None,
            product_id: request.product_id,
            version_number: request.version_number,
            version_name: request.version_name,
        };
        Ok(self.store.save_version(draft).await?)
    }

    pub async fn update_version(&self, actor: &Actor, id: VersionId, request: UpdateVersionRequest) -> ServiceResult<Version> {
        let existing = self.store.find_version(id).await?;
        let product_id = existing
            .product_id
            .ok_or_else(|| DomainError::invariant("version is not attached to a product"))?;
        self.require_full_edit(actor, product_id).await?;

        let draft = VersionDraft {
            id: Some(id),
            product_id,
            version_number: request.version_number,
            version_name: request.version_name,
        };
        Ok(self.store.save_version(draft).await?)
    }

    /// Detached versions can only be removed by a superuser.
    pub async fn delete_version(&self, actor: &Actor, id: VersionId) -> ServiceResult<Version> {
        let existing = self.store.find_version(id).await?;
        match existing.product_id {
            Some(product_id) => self.require_full_edit(actor, product_id).await?,
            None if actor.is_superuser() => {}
            None => return Err(DomainError::PermissionDenied.into()),
        }
        Ok(self.store.delete_version(id).await?)
    }

    /// Version mutations need full edit rights on the product; moderators
    /// cannot touch versions.
    async fn require_full_edit(&self, actor: &Actor, product_id: ProductId) -> ServiceResult<()> {
        let product = self.store.find_product(product_id).await?;
        match require_edit(actor, &product)? {
            EditCapability::FullEdit => Ok(()),
            _ => {
                tracing::warn!(product_id = %product_id, actor = %actor.id(), "version edit denied");
                Err(DomainError::PermissionDenied.into())
            }
        }
    }
}

pub async fn build_services(config: &AppConfig) -> Result<CatalogService, StoreError> {
    let store: Arc<dyn CatalogStore> = if config.use_persistent_stores {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| StoreError::Backend("DATABASE_URL is not set".to_string()))?;
        let store = PostgresCatalogStore::connect(url).await?;
        store.migrate().await?;
        tracing::info!("using postgres catalog store");
        Arc::new(store)
    } else {
        Arc::new(InMemoryCatalogStore::new())
    };

    let cache = build_cache(config);
    Ok(CatalogService::new(
        store,
        CatalogReadCache::new(config.caches_enabled, cache.clone()),
        DetailPageCache::new(config.caches_enabled, config.detail_cache_ttl, cache),
    ))
}

fn build_cache(config: &AppConfig) -> Arc<dyn KeyValueCache> {
    let Some(location) = config.cache_location.as_deref() else {
        return Arc::new(InMemoryCache::new());
    };

    #[cfg(feature = "redis")]
    {
        match storefront_infra::cache::RedisCache::new(location, "storefront:") {
            Ok(cache) => return Arc::new(cache),
            Err(e) => tracing::warn!(error = %e, "redis cache unavailable, falling back to in-process cache"),
        }
    }
    #[cfg(not(feature = "redis"))]
    {
        tracing::warn!(location, "CACHE_LOCATION set but redis feature not enabled, using in-process cache");
    }

    Arc::new(InMemoryCache::new())
}
