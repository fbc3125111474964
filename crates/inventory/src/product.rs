use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{Aggregate, AggregateRoot, DomainError, Money, MovementId, ProductId};

use crate::movement::{MovementKind, StockMovement};

/// Note attached to the movement recorded when a product is created with stock.
pub const INITIAL_STOCK_NOTE: &str = "Initial stock";

/// Most units a single product may hold.
///
/// Bounds every per-product quantity so catalogue-wide sums stay in range.
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Highest accepted unit price, in cents.
pub const MAX_PRICE_CENTS: u64 = 100_000_000_000_000;

/// Persisted state of a product (one catalogue row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    /// Units on hand.
    pub quantity: i64,
    /// Unit price.
    pub price: Money,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRecord {
    /// Stock value of this product (`quantity * price`).
    pub fn stock_value(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// Aggregate root: Product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    record: Option<ProductRecord>,
    version: u64,
}

impl Product {
    /// Create an empty, not-yet-created aggregate instance.
    pub fn empty(id: ProductId) -> Self {
        Self {
            id,
            record: None,
            version: 0,
        }
    }

    /// Rebuild the aggregate from its persisted state.
    pub fn from_record(record: ProductRecord) -> Self {
        Self {
            id: record.id,
            record: Some(record),
            version: 0,
        }
    }

    pub fn record(&self) -> Option<&ProductRecord> {
        self.record.as_ref()
    }

    pub fn into_record(self) -> Option<ProductRecord> {
        self.record
    }

    pub fn quantity(&self) -> i64 {
        self.record.as_ref().map(|r| r.quantity).unwrap_or(0)
    }

    pub fn is_created(&self) -> bool {
        self.record.is_some()
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub product_id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub quantity: i64,
    pub price: Money,
    pub category: Option<String>,
    pub image_url: Option<String>,
    /// Identifier used for the initial IN movement when `quantity > 0`.
    pub initial_movement_id: MovementId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordMovement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMovement {
    pub product_id: ProductId,
    pub movement_id: MovementId,
    pub kind: MovementKind,
    pub quantity: i64,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCommand {
    CreateProduct(CreateProduct),
    RecordMovement(RecordMovement),
}

/// Event: ProductCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub product_id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub price: Money,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StockMoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMoved {
    pub product_id: ProductId,
    pub movement_id: MovementId,
    pub kind: MovementKind,
    pub quantity: i64,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl StockMoved {
    pub fn to_movement(&self) -> StockMovement {
        StockMovement {
            id: self.movement_id,
            product_id: self.product_id,
            kind: self.kind,
            quantity: self.quantity,
            notes: self.notes.clone(),
            created_at: self.occurred_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    ProductCreated(ProductCreated),
    StockMoved(StockMoved),
}

impl ProductEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "inventory.product.created",
            ProductEvent::StockMoved(_) => "inventory.product.stock_moved",
        }
    }

    /// The stock movement carried by this event, if any.
    pub fn movement(&self) -> Option<StockMovement> {
        match self {
            ProductEvent::StockMoved(e) => Some(e.to_movement()),
            ProductEvent::ProductCreated(_) => None,
        }
    }
}

impl Aggregate for Product {
    type Command = ProductCommand;
    type Event = ProductEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductEvent::ProductCreated(e) => {
                self.id = e.product_id;
                self.record = Some(ProductRecord {
                    id: e.product_id,
                    name: e.name.clone(),
                    description: e.description.clone(),
                    sku: e.sku.clone(),
                    quantity: 0,
                    price: e.price,
                    category: e.category.clone(),
                    image_url: e.image_url.clone(),
                    created_at: e.occurred_at,
                    updated_at: e.occurred_at,
                });
            }
            ProductEvent::StockMoved(e) => {
                if let Some(record) = self.record.as_mut() {
                    record.quantity += e.kind.signed(e.quantity);
                    record.updated_at = e.occurred_at;
                }
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductCommand::CreateProduct(cmd) => self.handle_create(cmd),
            ProductCommand::RecordMovement(cmd) => self.handle_movement(cmd),
        }
    }
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Product {
    fn ensure_product_id(&self, product_id: ProductId) -> Result<(), DomainError> {
        if self.id != product_id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if self.is_created() {
            return Err(DomainError::conflict("product already exists"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if cmd.sku.trim().is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        if cmd.quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        if cmd.quantity > MAX_QUANTITY {
            return Err(DomainError::validation("quantity too large"));
        }
        if cmd.price.cents() > MAX_PRICE_CENTS {
            return Err(DomainError::validation("price too large"));
        }

        let mut events = vec![ProductEvent::ProductCreated(ProductCreated {
            product_id: cmd.product_id,
            name: cmd.name.trim().to_string(),
            description: non_blank(cmd.description.as_ref()),
            sku: cmd.sku.trim().to_string(),
            price: cmd.price,
            category: non_blank(cmd.category.as_ref()),
            image_url: non_blank(cmd.image_url.as_ref()),
            occurred_at: cmd.occurred_at,
        })];

        if cmd.quantity > 0 {
            events.push(ProductEvent::StockMoved(StockMoved {
                product_id: cmd.product_id,
                movement_id: cmd.initial_movement_id,
                kind: MovementKind::In,
                quantity: cmd.quantity,
                notes: Some(INITIAL_STOCK_NOTE.to_string()),
                occurred_at: cmd.occurred_at,
            }));
        }

        Ok(events)
    }

    fn handle_movement(&self, cmd: &RecordMovement) -> Result<Vec<ProductEvent>, DomainError> {
        if !self.is_created() {
            return Err(DomainError::not_found());
        }
        self.ensure_product_id(cmd.product_id)?;

        if cmd.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        let new_quantity = self
            .quantity()
            .checked_add(cmd.kind.signed(cmd.quantity))
            .filter(|q| *q <= MAX_QUANTITY)
            .ok_or_else(|| DomainError::validation("quantity too large"))?;
        if new_quantity < 0 {
            return Err(DomainError::invariant("stock cannot go negative"));
        }

        Ok(vec![ProductEvent::StockMoved(StockMoved {
            product_id: cmd.product_id,
            movement_id: cmd.movement_id,
            kind: cmd.kind,
            quantity: cmd.quantity,
            notes: non_blank(cmd.notes.as_ref()),
            occurred_at: cmd.occurred_at,
        })])
    }
}
