use serde::Deserialize;

use stockroom_core::Money;
use stockroom_inventory::{MovementKind, ProductRecord, StockMovement, StockStats};

use crate::app::services::{NewProduct, ProductDetail};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    #[serde(default)]
    pub quantity: i64,
    /// Unit price in currency units (e.g. `19.99`).
    #[serde(default)]
    pub price: f64,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl CreateProductRequest {
    pub fn into_new_product(self) -> Result<NewProduct, stockroom_core::DomainError> {
        Ok(NewProduct {
            price: Money::from_major(self.price)?,
            name: self.name,
            description: self.description,
            sku: self.sku,
            quantity: self.quantity,
            category: self.category,
            image_url: self.image_url,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordMovementRequest {
    #[serde(rename = "type", alias = "kind")]
    pub kind: MovementKind,
    pub quantity: i64,
    pub notes: Option<String>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

/// The statistics record consumed by the dashboard.
pub fn stats_to_json(stats: StockStats) -> serde_json::Value {
    serde_json::json!({
        "total_products": stats.total_products,
        "total_items": stats.total_items,
        "total_value": stats.total_value.to_major(),
        "low_stock": stats.low_stock,
    })
}

pub fn product_to_json(p: ProductRecord) -> serde_json::Value {
    serde_json::json!({
        "id": p.id.to_string(),
        "name": p.name,
        "description": p.description,
        "sku": p.sku,
        "quantity": p.quantity,
        "price": p.price.to_major(),
        "category": p.category,
        "image_url": p.image_url,
        "created_at": p.created_at.to_rfc3339(),
        "updated_at": p.updated_at.to_rfc3339(),
    })
}

pub fn movement_to_json(m: StockMovement) -> serde_json::Value {
    serde_json::json!({
        "id": m.id.to_string(),
        "type": m.kind.as_str(),
        "quantity": m.quantity,
        "notes": m.notes,
        "created_at": m.created_at.to_rfc3339(),
    })
}

pub fn product_detail_to_json(detail: ProductDetail) -> serde_json::Value {
    serde_json::json!({
        "product": product_to_json(detail.product),
        "transactions": detail.movements.into_iter().map(movement_to_json).collect::<Vec<_>>(),
    })
}
