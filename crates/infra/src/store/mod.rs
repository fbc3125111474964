//! Product storage boundary.
//!
//! The API talks to a `ProductStore`; the in-memory implementation backs
//! dev/test runs and the Postgres implementation backs deployments.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use stockroom_core::ProductId;
use stockroom_inventory::{ProductRecord, StockMovement, StockStats};

pub use in_memory::InMemoryProductStore;
pub use postgres::PostgresProductStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A product with the same SKU already exists.
    #[error("duplicate sku: {0}")]
    DuplicateSku(String),

    #[error("product not found")]
    NotFound,

    /// Applying a movement would take stock below zero.
    #[error("insufficient stock")]
    InsufficientStock,

    /// Applying a movement would take stock above `MAX_QUANTITY`.
    #[error("quantity too large")]
    QuantityTooLarge,

    #[error("database error: {0}")]
    Database(String),
}

/// Persistence for products and their stock movements.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Cheap round trip used by the health check.
    async fn ping(&self) -> StoreResult<()>;

    /// All products, ordered by name.
    async fn list_products(&self) -> StoreResult<Vec<ProductRecord>>;

    async fn get_product(&self, id: ProductId) -> StoreResult<Option<ProductRecord>>;

    /// Insert a new product together with its initial movements, atomically.
    async fn insert_product(
        &self,
        product: &ProductRecord,
        movements: &[StockMovement],
    ) -> StoreResult<()>;

    /// Apply a movement to its product's quantity and record it, atomically.
    ///
    /// Returns the updated product.
    async fn record_movement(&self, movement: &StockMovement) -> StoreResult<ProductRecord>;

    /// Most recent movements of a product, newest first.
    async fn recent_movements(
        &self,
        id: ProductId,
        limit: usize,
    ) -> StoreResult<Vec<StockMovement>>;

    /// Dashboard statistics over all products.
    async fn stats(&self) -> StoreResult<StockStats> {
        let products = self.list_products().await?;
        Ok(StockStats::compute(&products))
    }
}
