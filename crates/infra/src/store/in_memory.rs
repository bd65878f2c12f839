use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use storefront_catalog::{Category, Product, Version, VersionBatch, VersionDraft, VersionLedger, sort_for_listing};
use storefront_core::{CategoryId, DomainError, ProductId, VersionId};

use super::{CatalogStore, ProductEditOutcome, StoreError, unknown_category};

#[derive(Debug, Default)]
struct State {
    categories: HashMap<CategoryId, Category>,
    products: HashMap<ProductId, Product>,
    versions: HashMap<VersionId, Version>,
    by_product: HashMap<ProductId, HashSet<VersionId>>,
}

impl State {
    fn history(&self, product_id: ProductId) -> impl Iterator<Item = &Version> {
        self.by_product
            .get(&product_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.versions.get(id))
    }

    fn ledger(&self, product_id: ProductId) -> VersionLedger {
        VersionLedger::load(product_id, self.history(product_id).cloned())
    }

    /// Replace the stored history of `ledger`'s product with the ledger contents.
    fn write_back(&mut self, ledger: VersionLedger) {
        let product_id = ledger.product_id();
        for id in self.by_product.remove(&product_id).unwrap_or_default() {
            self.versions.remove(&id);
        }
        let mut ids = HashSet::new();
        for v in ledger.into_versions() {
            ids.insert(v.id);
            self.versions.insert(v.id, v);
        }
        self.by_product.insert(product_id, ids);
    }
}

/// In-memory catalog store for tests/dev.
///
/// A single `RwLock` guards all records; every mutation holds the write lock
/// for its whole duration, which serializes per-product version updates.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<State>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert_category(&self, category: Category) -> Result<Category, StoreError> {
        let mut state = self.write()?;
        if state.categories.contains_key(&category.id) {
            return Err(DomainError::constraint(format!("category {} already exists", category.id)).into());
        }
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_category(&self, id: CategoryId) -> Result<Category, StoreError> {
        self.read()?
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(StoreError::not_found)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut out: Vec<Category> = self.read()?.categories.values().cloned().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn find_product(&self, id: ProductId) -> Result<Product, StoreError> {
        self.read()?
            .products
            .get(&id)
            .cloned()
            .ok_or_else(StoreError::not_found)
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let mut out: Vec<Product> = self.read()?.products.values().cloned().collect();
        sort_for_listing(&mut out);
        Ok(out)
    }

    async fn insert_product(&self, product: Product) -> Result<Product, StoreError> {
        let mut state = self.write()?;
        if !state.categories.contains_key(&product.category_id) {
            return Err(unknown_category());
        }
        if state.products.contains_key(&product.id) {
            return Err(DomainError::constraint(format!("product {} already exists", product.id)).into());
        }
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn record_view(&self, id: ProductId) -> Result<Product, StoreError> {
        let mut state = self.write()?;
        let product = state.products.get_mut(&id).ok_or_else(StoreError::not_found)?;
        product.record_view();
        Ok(product.clone())
    }

    async fn commit_product_edit(&self, mut product: Product, batch: VersionBatch) -> Result<ProductEditOutcome, StoreError> {
        let mut state = self.write()?;
        let stored = state.products.get(&product.id).ok_or_else(StoreError::not_found)?;
        if !state.categories.contains_key(&product.category_id) {
            return Err(unknown_category());
        }
        product.views_counter = stored.views_counter;
        product.owner = stored.owner;
        product.created_at = stored.created_at;

        let mut ledger = state.ledger(product.id);
        let saved_versions = ledger.apply_batch(&batch)?;

        state.write_back(ledger);
        state.products.insert(product.id, product.clone());
        Ok(ProductEditOutcome { product, saved_versions })
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.products.remove(&id).ok_or_else(StoreError::not_found)?;
        for version_id in state.by_product.remove(&id).unwrap_or_default() {
            if let Some(v) = state.versions.get_mut(&version_id) {
                v.product_id = None;
            }
        }
        Ok(())
    }

    async fn find_version(&self, id: VersionId) -> Result<Version, StoreError> {
        self.read()?
            .versions
            .get(&id)
            .cloned()
            .ok_or_else(StoreError::not_found)
    }

    async fn list_versions(&self, product_id: Option<ProductId>) -> Result<Vec<Version>, StoreError> {
        let state = self.read()?;
        let mut out: Vec<Version> = match product_id {
            Some(product_id) => state.history(product_id).cloned().collect(),
            None => state.versions.values().cloned().collect(),
        };
        out.sort_by(|a, b| Version::default_order(a, b).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn active_version(&self, product_id: ProductId) -> Result<Option<Version>, StoreError> {
        Ok(self.read()?.history(product_id).find(|v| v.is_current).cloned())
    }

    async fn save_version(&self, draft: VersionDraft) -> Result<Version, StoreError> {
        let mut state = self.write()?;
        if !state.products.contains_key(&draft.product_id) {
            return Err(StoreError::not_found());
        }

        let mut ledger = state.ledger(draft.product_id);
        let saved = ledger.save(draft)?;
        state.write_back(ledger);
        Ok(saved)
    }

    async fn delete_version(&self, id: VersionId) -> Result<Version, StoreError> {
        let mut state = self.write()?;
        let removed = state.versions.remove(&id).ok_or_else(StoreError::not_found)?;
        if let Some(ids) = removed.product_id.and_then(|p| state.by_product.get_mut(&p)) {
            ids.remove(&id);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use storefront_catalog::{CategoryForm, ProductForm, VersionEntry};
    use storefront_core::UserId;

    async fn seeded() -> (InMemoryCatalogStore, Category, Product) {
        let store = InMemoryCatalogStore::new();
        let category = Category::create(
            CategoryId::new(),
            CategoryForm {
                name: "Phones".to_string(),
                description: "Mobile phones".to_string(),
            },
        )
        .unwrap();
        store.insert_category(category.clone()).await.unwrap();
        let product = Product::create(ProductId::new(), form(category.id, "Pixel"), UserId::new(), Utc::now()).unwrap();
        store.insert_product(product.clone()).await.unwrap();
        (store, category, product)
    }

    fn form(category_id: CategoryId, name: &str) -> ProductForm {
        ProductForm {
            name: name.to_string(),
            description: "A phone".to_string(),
            image: None,
            category_id,
            price: Decimal::new(19_999, 2),
            is_published: false,
        }
    }

    fn entry(name: &str) -> VersionEntry {
        VersionEntry {
            version_name: Some(name.to_string()),
            ..VersionEntry::default()
        }
    }

    #[tokio::test]
    async fn insert_product_requires_existing_category() {
        let store = InMemoryCatalogStore::new();
        let product = Product::create(ProductId::new(), form(CategoryId::new(), "Pixel"), UserId::new(), Utc::now()).unwrap();
        let err = store.insert_product(product).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn record_view_increments_once_per_call() {
        let (store, _, product) = seeded().await;
        store.record_view(product.id).await.unwrap();
        let after = store.record_view(product.id).await.unwrap();
        assert_eq!(after.views_counter, 2);
    }

    #[tokio::test]
    async fn concurrent_views_are_not_lost() {
        let (store, _, product) = seeded().await;
        let store = std::sync::Arc::new(store);
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.record_view(product.id).await.unwrap() }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.find_product(product.id).await.unwrap().views_counter, 16);
    }

    #[tokio::test]
    async fn commit_edit_saves_versions_and_keeps_counters() {
        let (store, _, product) = seeded().await;
        store.record_view(product.id).await.unwrap();

        let mut edited = product.clone();
        edited.name = "Pixel 9".to_string();
        edited.views_counter = 0;
        let batch = VersionBatch::from_entries(product.id, vec![entry("1.0"), entry("1.1")]).unwrap();
        let outcome = store.commit_product_edit(edited, batch).await.unwrap();

        assert_eq!(outcome.product.views_counter, 1);
        assert_eq!(outcome.saved_versions.len(), 2);
        let active = store.active_version(product.id).await.unwrap().unwrap();
        assert_eq!(active.version_name.as_deref(), Some("1.1"));
        assert_eq!(active.version_number, 2);
    }

    #[tokio::test]
    async fn failed_batch_rolls_back_product_and_versions() {
        let (store, _, product) = seeded().await;
        store
            .save_version(VersionDraft::new(product.id, "1.0").numbered(1))
            .await
            .unwrap();

        let mut edited = product.clone();
        edited.name = "Renamed".to_string();
        let duplicate = VersionEntry {
            version_number: Some(1),
            ..entry("clash")
        };
        let batch = VersionBatch::from_entries(product.id, vec![entry("2.0"), duplicate]).unwrap();
        let err = store.commit_product_edit(edited, batch).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::ConstraintViolation(_))));

        assert_eq!(store.find_product(product.id).await.unwrap().name, "Pixel");
        assert_eq!(store.list_versions(Some(product.id)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_product_orphans_versions() {
        let (store, _, product) = seeded().await;
        let v = store.save_version(VersionDraft::new(product.id, "1.0")).await.unwrap();
        store.delete_product(product.id).await.unwrap();

        assert!(matches!(store.find_product(product.id).await, Err(StoreError::Domain(DomainError::NotFound))));
        assert_eq!(store.find_version(v.id).await.unwrap().product_id, None);
    }

    #[tokio::test]
    async fn save_version_rejects_foreign_version_id() {
        let (store, category, product) = seeded().await;
        let other = Product::create(ProductId::new(), form(category.id, "Other"), UserId::new(), Utc::now()).unwrap();
        store.insert_product(other.clone()).await.unwrap();
        let v = store.save_version(VersionDraft::new(other.id, "1.0")).await.unwrap();

        let mut draft = VersionDraft::new(product.id, "stolen");
        draft.id = Some(v.id);
        let err = store.save_version(draft).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::InvariantViolation(_))));
    }

    #[tokio::test]
    async fn commit_edit_cannot_take_over_another_products_version() {
        let (store, category, product) = seeded().await;
        let other = Product::create(ProductId::new(), form(category.id, "Other"), UserId::new(), Utc::now()).unwrap();
        store.insert_product(other.clone()).await.unwrap();
        let theirs = store.save_version(VersionDraft::new(other.id, "1.0")).await.unwrap();

        let takeover = VersionEntry {
            id: Some(theirs.id),
            ..entry("stolen")
        };
        let batch = VersionBatch::from_entries(product.id, vec![takeover]).unwrap();
        let err = store.commit_product_edit(product.clone(), batch).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::InvariantViolation(_))));

        assert_eq!(store.find_version(theirs.id).await.unwrap(), theirs);
        assert_eq!(store.active_version(other.id).await.unwrap(), Some(theirs));
        assert!(store.list_versions(Some(product.id)).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_leave_one_current_version() {
        let (store, _, product) = seeded().await;
        let store = std::sync::Arc::new(store);
        let mut handles = Vec::new();
        for i in 0..24 {
            let store = store.clone();
            let product = product.clone();
            handles.push(tokio::spawn(async move {
                if i % 3 == 0 {
                    let batch = VersionBatch::from_entries(product.id, vec![entry(&format!("edit-{i}"))]).unwrap();
                    store.commit_product_edit(product, batch).await.unwrap();
                } else {
                    store
                        .save_version(VersionDraft::new(product.id, format!("save-{i}")))
                        .await
                        .unwrap();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let versions = store.list_versions(Some(product.id)).await.unwrap();
        assert_eq!(versions.len(), 24);
        assert_eq!(versions.iter().filter(|v| v.is_current).count(), 1);
        let mut numbers: Vec<u32> = versions.iter().map(|v| v.version_number).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=24).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn delete_version_drops_it_from_the_history() {
        let (store, _, product) = seeded().await;
        let first = store.save_version(VersionDraft::new(product.id, "1.0")).await.unwrap();
        let second = store.save_version(VersionDraft::new(product.id, "1.1")).await.unwrap();
        store.delete_version(second.id).await.unwrap();

        let remaining = store.list_versions(Some(product.id)).await.unwrap();
        assert_eq!(remaining.iter().map(|v| v.id).collect::<Vec<_>>(), vec![first.id]);
        assert_eq!(store.active_version(product.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_products_uses_listing_order() {
        let (store, category, _) = seeded().await;
        let apple = Product::create(ProductId::new(), form(category.id, "Apple"), UserId::new(), Utc::now()).unwrap();
        store.insert_product(apple).await.unwrap();
        let names: Vec<String> = store.list_products().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Apple".to_string(), "Pixel".to_string()]);
    }
}
