//! Postgres-backed product store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|-----------------------|------------|
//! | Database (unique violation on `products.sku`) | `23505` | `DuplicateSku` |
//! | Database (check violation on `products_quantity_floor`) | `23514` | `InsufficientStock` |
//! | Database (check violation on `products_quantity_ceiling`) | `23514` | `QuantityTooLarge` |
//! | Database (bigint overflow in the quantity update) | `22003` | `QuantityTooLarge` |
//! | Anything else | any | `Database` |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::instrument;

use stockroom_core::{Money, MovementId, ProductId};
use stockroom_inventory::{
    LOW_STOCK_THRESHOLD, MovementKind, ProductRecord, StockMovement, StockStats,
};

use super::{ProductStore, StoreError, StoreResult};

/// The `products_quantity_ceiling` literal tracks `MAX_QUANTITY`.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id          UUID PRIMARY KEY,
        name        TEXT NOT NULL,
        description TEXT NULL,
        sku         TEXT NOT NULL UNIQUE,
        quantity    BIGINT NOT NULL DEFAULT 0
            CONSTRAINT products_quantity_floor CHECK (quantity >= 0)
            CONSTRAINT products_quantity_ceiling CHECK (quantity <= 1000000000),
        price_cents BIGINT NOT NULL CHECK (price_cents >= 0),
        category    TEXT NULL,
        image_url   TEXT NULL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory_transactions (
        id               UUID PRIMARY KEY,
        product_id       UUID NOT NULL REFERENCES products(id),
        transaction_type TEXT NOT NULL CHECK (transaction_type IN ('IN', 'OUT')),
        quantity         BIGINT NOT NULL CHECK (quantity > 0),
        notes            TEXT NULL,
        created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS inventory_transactions_product_created
        ON inventory_transactions (product_id, created_at DESC)
    "#,
];

/// Postgres-backed product store.
///
/// Every write that touches both tables runs in one transaction. Stock
/// changes are applied with a relative `UPDATE` so concurrent movements
/// cannot lose updates; the `quantity >= 0` check rejects overdraws.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the tables if they do not exist yet.
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }
}

fn cents_to_db(money: Money) -> i64 {
    i64::try_from(money.cents()).unwrap_or(i64::MAX)
}

fn product_from_row(row: &PgRow) -> Result<ProductRecord, sqlx::Error> {
    let price_cents: i64 = row.try_get("price_cents")?;
    Ok(ProductRecord {
        id: ProductId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        sku: row.try_get("sku")?,
        quantity: row.try_get("quantity")?,
        price: Money::from_cents(price_cents.max(0) as u64),
        category: row.try_get("category")?,
        image_url: row.try_get("image_url")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn movement_from_row(row: &PgRow) -> Result<StockMovement, sqlx::Error> {
    let kind: String = row.try_get("transaction_type")?;
    let kind = kind
        .parse::<MovementKind>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(StockMovement {
        id: MovementId::from_uuid(row.try_get("id")?),
        product_id: ProductId::from_uuid(row.try_get("product_id")?),
        kind,
        quantity: row.try_get("quantity")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

async fn insert_movement<'e, E>(executor: E, movement: &StockMovement) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO inventory_transactions (id, product_id, transaction_type, quantity, notes, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(movement.id.as_uuid())
    .bind(movement.product_id.as_uuid())
    .bind(movement.kind.as_str())
    .bind(movement.quantity)
    .bind(movement.notes.as_deref())
    .bind(movement.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> StoreResult<Vec<ProductRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, sku, quantity, price_cents, category, image_url, created_at, updated_at
            FROM products
            ORDER BY name, sku
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_products", e))
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> StoreResult<Option<ProductRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, sku, quantity, price_cents, category, image_url, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_product", e))?;

        row.as_ref()
            .map(product_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_product", e))
    }

    #[instrument(skip(self, product, movements), fields(product_id = %product.id, sku = %product.sku))]
    async fn insert_product(
        &self,
        product: &ProductRecord,
        movements: &[StockMovement],
    ) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, sku, quantity, price_cents, category, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.description.as_deref())
        .bind(&product.sku)
        .bind(product.quantity)
        .bind(cents_to_db(product.price))
        .bind(product.category.as_deref())
        .bind(product.image_url.as_deref())
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match map_sqlx_error("insert_product", e) {
            StoreError::DuplicateSku(_) => StoreError::DuplicateSku(product.sku.clone()),
            other => other,
        })?;

        for movement in movements {
            insert_movement(&mut *tx, movement)
                .await
                .map_err(|e| map_sqlx_error("insert_movement", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    #[instrument(skip(self, movement), fields(product_id = %movement.product_id, kind = %movement.kind))]
    async fn record_movement(&self, movement: &StockMovement) -> StoreResult<ProductRecord> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity + $2, updated_at = $3
            WHERE id = $1
            RETURNING id, name, description, sku, quantity, price_cents, category, image_url, created_at, updated_at
            "#,
        )
        .bind(movement.product_id.as_uuid())
        .bind(movement.kind.signed(movement.quantity))
        .bind(movement.created_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_quantity", e))?
        .ok_or(StoreError::NotFound)?;

        let updated = product_from_row(&row).map_err(|e| map_sqlx_error("update_quantity", e))?;

        insert_movement(&mut *tx, movement)
            .await
            .map_err(|e| map_sqlx_error("insert_movement", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(updated)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn recent_movements(
        &self,
        id: ProductId,
        limit: usize,
    ) -> StoreResult<Vec<StockMovement>> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, transaction_type, quantity, notes, created_at
            FROM inventory_transactions
            WHERE product_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("recent_movements", e))?;

        rows.iter()
            .map(movement_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("recent_movements", e))
    }

    #[instrument(skip(self))]
    async fn stats(&self) -> StoreResult<StockStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*)::BIGINT                                        AS total_products,
                LEAST(COALESCE(SUM(quantity), 0), 9223372036854775807)::BIGINT AS total_items,
                LEAST(
                    COALESCE(SUM(quantity::NUMERIC * price_cents), 0),
                    18446744073709551615
                )::TEXT                                                 AS total_value_cents,
                COUNT(*) FILTER (WHERE quantity < $1)::BIGINT           AS low_stock
            FROM products
            "#,
        )
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("stats", e))?;

        let read = |column: &str| -> StoreResult<i64> {
            row.try_get::<i64, _>(column)
                .map_err(|e| map_sqlx_error("stats", e))
        };

        // Exact sum capped at u64::MAX cents, matching `Money::saturating_add`.
        let total_value_cents = row
            .try_get::<String, _>("total_value_cents")
            .map_err(|e| map_sqlx_error("stats", e))?;
        let total_value_cents = total_value_cents
            .parse::<u64>()
            .map_err(|e| StoreError::Database(format!("invalid stock value {total_value_cents}: {e}")))?;

        Ok(StockStats {
            total_products: read("total_products")?.max(0) as u64,
            total_items: read("total_items")?,
            total_value: Money::from_cents(total_value_cents),
            low_stock: read("low_stock")?.max(0) as u64,
        })
    }
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match (db_err.code().as_deref(), db_err.constraint()) {
                (Some("23505"), _) => StoreError::DuplicateSku(msg),
                (Some("23514"), Some("products_quantity_ceiling")) => StoreError::QuantityTooLarge,
                (Some("23514"), _) => StoreError::InsufficientStock,
                (Some("22003"), _) => StoreError::QuantityTooLarge,
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Database(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}
