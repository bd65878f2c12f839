//! Postgres-backed catalog store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Domain(ConstraintViolation)` |
//! | Database (foreign key violation) | `23503` | `Domain(Validation)` on `category_id` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / other | N/A | `Backend` |
//!
//! ## Version history
//!
//! Every operation that changes a product's versions runs in one transaction
//! that first takes `SELECT ... FOR UPDATE` on the product row. The history is
//! then loaded into a `VersionLedger`, mutated, and written back (demote all,
//! then upsert), so two concurrent edits of one product can never leave two
//! current versions.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use storefront_catalog::{Category, Price, Product, Version, VersionBatch, VersionDraft, VersionLedger};
use storefront_core::{CategoryId, DomainError, ProductId, UserId, VersionId};

use super::{CatalogStore, ProductEditOutcome, StoreError, unknown_category};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id UUID PRIMARY KEY,
        name VARCHAR(50) NOT NULL,
        description TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY,
        name VARCHAR(50) NOT NULL,
        description VARCHAR(500) NOT NULL,
        image TEXT NULL,
        category_id UUID NOT NULL REFERENCES categories (id) ON DELETE CASCADE,
        price NUMERIC(10, 2) NOT NULL CHECK (price >= 0),
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL,
        is_published BOOLEAN NOT NULL DEFAULT FALSE,
        views_counter BIGINT NOT NULL DEFAULT 0 CHECK (views_counter >= 0),
        owner_id UUID NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS versions (
        id UUID PRIMARY KEY,
        product_id UUID NULL REFERENCES products (id) ON DELETE SET NULL,
        version_number INTEGER NOT NULL CHECK (version_number > 0),
        version_name VARCHAR(50) NULL,
        is_current BOOLEAN NOT NULL DEFAULT FALSE,
        CONSTRAINT unique_product_version UNIQUE (product_id, version_number)
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS one_current_version_per_product
        ON versions (product_id) WHERE is_current AND product_id IS NOT NULL
    "#,
];

const PRODUCT_COLUMNS: &str = "id, name, description, image, category_id, price, created_at, updated_at, is_published, views_counter, owner_id";

#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the catalog tables if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }

    async fn begin(&self) -> Result<Transaction<'_, Postgres>, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self, category), fields(category_id = %category.id), err)]
    async fn insert_category(&self, category: Category) -> Result<Category, StoreError> {
        sqlx::query("INSERT INTO categories (id, name, description) VALUES ($1, $2, $3)")
            .bind(category.id.as_uuid())
            .bind(&category.name)
            .bind(&category.description)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_category", e))?;
        Ok(category)
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn find_category(&self, id: CategoryId) -> Result<Category, StoreError> {
        let row = sqlx::query("SELECT id, name, description FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_category", e))?
            .ok_or_else(StoreError::not_found)?;
        category_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query("SELECT id, name, description FROM categories ORDER BY name ASC, id ASC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_categories", e))?;
        rows.iter().map(category_from_row).collect()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn find_product(&self, id: ProductId) -> Result<Product, StoreError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product", e))?
            .ok_or_else(StoreError::not_found)?;
        product_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name ASC, description ASC, price ASC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;
        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn insert_product(&self, product: Product) -> Result<Product, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, image, category_id, price,
                created_at, updated_at, is_published, views_counter, owner_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.image.as_deref())
        .bind(product.category_id.as_uuid())
        .bind(product.price.amount())
        .bind(product.created_at)
        .bind(product.updated_at)
        .bind(product.is_published)
        .bind(counter_to_db(product.views_counter))
        .bind(product.owner.map(uuid::Uuid::from))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn record_view(&self, id: ProductId) -> Result<Product, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE products SET views_counter = views_counter + 1 WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("record_view", e))?
        .ok_or_else(StoreError::not_found)?;
        product_from_row(&row)
    }

    #[instrument(skip(self, product, batch), fields(product_id = %product.id), err)]
    async fn commit_product_edit(&self, mut product: Product, batch: VersionBatch) -> Result<ProductEditOutcome, StoreError> {
        let mut tx = self.begin().await?;

        let stored = lock_product(&mut tx, product.id).await?;
        if !category_exists(&mut tx, product.category_id).await? {
            return Err(unknown_category());
        }
        product.views_counter = stored.views_counter;
        product.owner = stored.owner;
        product.created_at = stored.created_at;

        let mut ledger = load_ledger(&mut tx, product.id).await?;
        let saved_versions = ledger.apply_batch(&batch)?;
        write_ledger(&mut tx, &batch.removals, ledger).await?;

        sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, image = $4, category_id = $5,
                price = $6, updated_at = $7, is_published = $8
            WHERE id = $1
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.image.as_deref())
        .bind(product.category_id.as_uuid())
        .bind(product.price.amount())
        .bind(product.updated_at)
        .bind(product.is_published)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(ProductEditOutcome { product, saved_versions })
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        // Versions are detached by ON DELETE SET NULL.
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found());
        }
        Ok(())
    }

    #[instrument(skip(self), fields(version_id = %id), err)]
    async fn find_version(&self, id: VersionId) -> Result<Version, StoreError> {
        let row = sqlx::query("SELECT id, product_id, version_number, version_name, is_current FROM versions WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_version", e))?
            .ok_or_else(StoreError::not_found)?;
        version_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn list_versions(&self, product_id: Option<ProductId>) -> Result<Vec<Version>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, version_number, version_name, is_current
            FROM versions
            WHERE $1::uuid IS NULL OR product_id = $1
            ORDER BY is_current DESC, version_number ASC, id ASC
            "#,
        )
        .bind(product_id.map(uuid::Uuid::from))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_versions", e))?;
        rows.iter().map(version_from_row).collect()
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn active_version(&self, product_id: ProductId) -> Result<Option<Version>, StoreError> {
        let row = sqlx::query(
            "SELECT id, product_id, version_number, version_name, is_current FROM versions WHERE product_id = $1 AND is_current",
        )
        .bind(product_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("active_version", e))?;
        row.as_ref().map(version_from_row).transpose()
    }

    #[instrument(skip(self, draft), fields(product_id = %draft.product_id), err)]
    async fn save_version(&self, draft: VersionDraft) -> Result<Version, StoreError> {
        let mut tx = self.begin().await?;
        lock_product(&mut tx, draft.product_id).await?;

        let mut ledger = load_ledger(&mut tx, draft.product_id).await?;
        let saved = ledger.save(draft)?;
        write_ledger(&mut tx, &[], ledger).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(saved)
    }

    #[instrument(skip(self), fields(version_id = %id), err)]
    async fn delete_version(&self, id: VersionId) -> Result<Version, StoreError> {
        let row = sqlx::query(
            "DELETE FROM versions WHERE id = $1 RETURNING id, product_id, version_number, version_name, is_current",
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_version", e))?
        .ok_or_else(StoreError::not_found)?;
        version_from_row(&row)
    }
}

/// Lock the product row for the rest of the transaction.
async fn lock_product(tx: &mut Transaction<'_, Postgres>, id: ProductId) -> Result<Product, StoreError> {
    let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE"))
        .bind(id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("lock_product", e))?
        .ok_or_else(StoreError::not_found)?;
    product_from_row(&row)
}

async fn category_exists(tx: &mut Transaction<'_, Postgres>, id: CategoryId) -> Result<bool, StoreError> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
        .bind(id.as_uuid())
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("category_exists", e))
}

async fn load_ledger(tx: &mut Transaction<'_, Postgres>, product_id: ProductId) -> Result<VersionLedger, StoreError> {
    let rows = sqlx::query("SELECT id, product_id, version_number, version_name, is_current FROM versions WHERE product_id = $1")
        .bind(product_id.as_uuid())
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("load_versions", e))?;
    let versions = rows.iter().map(version_from_row).collect::<Result<Vec<_>, _>>()?;
    Ok(VersionLedger::load(product_id, versions))
}

/// Persist a ledger: removals first, then demote everything, then upsert the
/// final history. The ordering keeps both unique indexes satisfied at every
/// statement boundary.
async fn write_ledger(
    tx: &mut Transaction<'_, Postgres>,
    removals: &[VersionId],
    ledger: VersionLedger,
) -> Result<(), StoreError> {
    let product_id = ledger.product_id();

    if !removals.is_empty() {
        let ids: Vec<uuid::Uuid> = removals.iter().map(|id| *id.as_uuid()).collect();
        sqlx::query("DELETE FROM versions WHERE product_id = $1 AND id = ANY($2)")
            .bind(product_id.as_uuid())
            .bind(ids)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("remove_versions", e))?;
    }

    sqlx::query("UPDATE versions SET is_current = FALSE WHERE product_id = $1 AND is_current")
        .bind(product_id.as_uuid())
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("demote_versions", e))?;

    for v in ledger.into_versions() {
        sqlx::query(
            r#"
            INSERT INTO versions (id, product_id, version_number, version_name, is_current)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                product_id = EXCLUDED.product_id,
                version_number = EXCLUDED.version_number,
                version_name = EXCLUDED.version_name,
                is_current = EXCLUDED.is_current
            "#,
        )
        .bind(v.id.as_uuid())
        .bind(product_id.as_uuid())
        .bind(number_to_db(v.version_number)?)
        .bind(v.version_name.as_deref())
        .bind(v.is_current)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_version", e))?;
    }
    Ok(())
}

fn counter_to_db(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn number_to_db(value: u32) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|_| DomainError::validation("version_number", "ensure this value is less than or equal to 2147483647").into())
}

fn decode_error(column: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("failed to read {column}: {e}"))
}

fn category_from_row(row: &PgRow) -> Result<Category, StoreError> {
    Ok(Category {
        id: CategoryId::from_uuid(row.try_get("id").map_err(|e| decode_error("id", e))?),
        name: row.try_get("name").map_err(|e| decode_error("name", e))?,
        description: row.try_get("description").map_err(|e| decode_error("description", e))?,
    })
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let price: Decimal = row.try_get("price").map_err(|e| decode_error("price", e))?;
    let views: i64 = row.try_get("views_counter").map_err(|e| decode_error("views_counter", e))?;
    let owner: Option<uuid::Uuid> = row.try_get("owner_id").map_err(|e| decode_error("owner_id", e))?;

    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id").map_err(|e| decode_error("id", e))?),
        name: row.try_get("name").map_err(|e| decode_error("name", e))?,
        description: row.try_get("description").map_err(|e| decode_error("description", e))?,
        image: row.try_get("image").map_err(|e| decode_error("image", e))?,
        category_id: CategoryId::from_uuid(row.try_get("category_id").map_err(|e| decode_error("category_id", e))?),
        price: Price::new(price).map_err(|e| decode_error("price", e))?,
        created_at: row.try_get("created_at").map_err(|e| decode_error("created_at", e))?,
        updated_at: row.try_get("updated_at").map_err(|e| decode_error("updated_at", e))?,
        is_published: row.try_get("is_published").map_err(|e| decode_error("is_published", e))?,
        views_counter: u64::try_from(views).unwrap_or(0),
        owner: owner.map(UserId::from_uuid),
    })
}

fn version_from_row(row: &PgRow) -> Result<Version, StoreError> {
    let product_id: Option<uuid::Uuid> = row.try_get("product_id").map_err(|e| decode_error("product_id", e))?;
    let number: i32 = row.try_get("version_number").map_err(|e| decode_error("version_number", e))?;

    Ok(Version {
        id: VersionId::from_uuid(row.try_get("id").map_err(|e| decode_error("id", e))?),
        product_id: product_id.map(ProductId::from_uuid),
        version_number: u32::try_from(number).map_err(|e| decode_error("version_number", e))?,
        version_name: row.try_get("version_name").map_err(|e| decode_error("version_name", e))?,
        is_current: row.try_get("is_current").map_err(|e| decode_error("is_current", e))?,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Domain(DomainError::constraint(msg)),
                Some("23503") => unknown_category(),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {}", operation)),
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
