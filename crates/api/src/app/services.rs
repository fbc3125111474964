//! Store wiring and the product use cases behind the HTTP handlers.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use stockroom_core::{Aggregate, DomainError, Money, MovementId, ProductId};
use stockroom_infra::{
    InMemoryProductStore, PostgresProductStore, ProductStore, StoreError, StoreResult,
};
use stockroom_inventory::{
    CreateProduct, MovementKind, Product, ProductCommand, ProductEvent, ProductRecord,
    RecordMovement, StockMovement, StockStats,
};

use crate::config::Config;

/// Number of movements shown on a product's detail view.
pub const RECENT_MOVEMENTS_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub quantity: i64,
    pub price: Money,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// A product together with its most recent movements.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub product: ProductRecord,
    pub movements: Vec<StockMovement>,
}

pub struct AppServices {
    store: Arc<dyn ProductStore>,
}

/// Pick the store from configuration: Postgres when `DATABASE_URL` is set,
/// in-memory otherwise.
pub async fn build_services(config: &Config) -> StoreResult<Arc<AppServices>> {
    let store: Arc<dyn ProductStore> = match &config.database_url {
        Some(url) => {
            let store = PostgresProductStore::connect(url).await?;
            store.migrate().await?;
            tracing::info!("using postgres product store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory product store");
            Arc::new(InMemoryProductStore::new())
        }
    };
    Ok(Arc::new(AppServices::new(store)))
}

impl AppServices {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryProductStore::new()))
    }

    pub async fn health(&self) -> StoreResult<()> {
        self.store.ping().await
    }

    pub async fn stats(&self) -> Result<StockStats, ServiceError> {
        Ok(self.store.stats().await?)
    }

    pub async fn list_products(&self) -> Result<Vec<ProductRecord>, ServiceError> {
        Ok(self.store.list_products().await?)
    }

    pub async fn product_detail(&self, id: ProductId) -> Result<ProductDetail, ServiceError> {
        let product = self
            .store
            .get_product(id)
            .await?
            .ok_or(DomainError::NotFound)?;
        let movements = self
            .store
            .recent_movements(id, RECENT_MOVEMENTS_LIMIT)
            .await?;
        Ok(ProductDetail { product, movements })
    }

    pub async fn create_product(&self, input: NewProduct) -> Result<ProductRecord, ServiceError> {
        let product_id = ProductId::new();
        let cmd = ProductCommand::CreateProduct(CreateProduct {
            product_id,
            name: input.name,
            description: input.description,
            sku: input.sku,
            quantity: input.quantity,
            price: input.price,
            category: input.category,
            image_url: input.image_url,
            initial_movement_id: MovementId::new(),
            occurred_at: Utc::now(),
        });

        let mut product = Product::empty(product_id);
        let events = product.execute(&cmd)?;
        let movements: Vec<StockMovement> = events.iter().filter_map(ProductEvent::movement).collect();
        let record = product
            .into_record()
            .ok_or_else(|| DomainError::invariant("product was not created"))?;

        self.store.insert_product(&record, &movements).await?;
        tracing::info!(
            product_id = %record.id,
            sku = %record.sku,
            price = %record.price,
            stock_value = %record.stock_value(),
            "product created"
        );
        Ok(record)
    }

    pub async fn record_movement(
        &self,
        product_id: ProductId,
        kind: MovementKind,
        quantity: i64,
        notes: Option<String>,
    ) -> Result<ProductRecord, ServiceError> {
        let record = self
            .store
            .get_product(product_id)
            .await?
            .ok_or(DomainError::NotFound)?;
        let product = Product::from_record(record);

        let cmd = ProductCommand::RecordMovement(RecordMovement {
            product_id,
            movement_id: MovementId::new(),
            kind,
            quantity,
            notes,
            occurred_at: Utc::now(),
        });
        let events = product.handle(&cmd)?;

        let mut updated = product.into_record().ok_or(DomainError::NotFound)?;
        for movement in events.iter().filter_map(ProductEvent::movement) {
            // Store re-checks the stock floor atomically.
            updated = self.store.record_movement(&movement).await?;
        }

        tracing::info!(
            product_id = %product_id,
            kind = %kind,
            quantity,
            new_quantity = updated.quantity,
            "stock movement recorded"
        );
        Ok(updated)
    }
}
