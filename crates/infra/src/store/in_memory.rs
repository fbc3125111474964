use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use stockroom_core::ProductId;
use stockroom_inventory::{ProductRecord, StockMovement, MAX_QUANTITY};

use super::{ProductStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct State {
    products: HashMap<ProductId, ProductRecord>,
    movements: Vec<StockMovement>,
}

/// In-memory product store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    inner: RwLock<State>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Database("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn ping(&self) -> StoreResult<()> {
        self.inner.read().map(|_| ()).map_err(|_| poisoned())
    }

    async fn list_products(&self) -> StoreResult<Vec<ProductRecord>> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        let mut products: Vec<ProductRecord> = state.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.sku.cmp(&b.sku)));
        Ok(products)
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Option<ProductRecord>> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        Ok(state.products.get(&id).cloned())
    }

    async fn insert_product(
        &self,
        product: &ProductRecord,
        movements: &[StockMovement],
    ) -> StoreResult<()> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;
        if state.products.values().any(|p| p.sku == product.sku) {
            return Err(StoreError::DuplicateSku(product.sku.clone()));
        }
        state.products.insert(product.id, product.clone());
        state.movements.extend(movements.iter().cloned());
        Ok(())
    }

    async fn record_movement(&self, movement: &StockMovement) -> StoreResult<ProductRecord> {
        let mut state = self.inner.write().map_err(|_| poisoned())?;
        let product = state
            .products
            .get_mut(&movement.product_id)
            .ok_or(StoreError::NotFound)?;

        let new_quantity = product
            .quantity
            .checked_add(movement.kind.signed(movement.quantity))
            .filter(|q| *q <= MAX_QUANTITY)
            .ok_or(StoreError::QuantityTooLarge)?;
        if new_quantity < 0 {
            return Err(StoreError::InsufficientStock);
        }
        product.quantity = new_quantity;
        product.updated_at = movement.created_at;
        let updated = product.clone();

        state.movements.push(movement.clone());
        Ok(updated)
    }

    async fn recent_movements(
        &self,
        id: ProductId,
        limit: usize,
    ) -> StoreResult<Vec<StockMovement>> {
        let state = self.inner.read().map_err(|_| poisoned())?;
        // Insertion order is chronological, so walking backwards yields newest first.
        Ok(state
            .movements
            .iter()
            .rev()
            .filter(|m| m.product_id == id)
            .take(limit)
            .cloned()
            .collect())
    }
}
