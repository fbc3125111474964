//! Inventory domain module.
//!
//! This crate contains business rules for products and their stock
//! movements, implemented purely as deterministic domain logic (no IO, no
//! HTTP, no storage).

pub mod movement;
pub mod product;
pub mod stats;

pub use movement::{MovementKind, StockMovement};
pub use product::{
    CreateProduct, Product, ProductCommand, ProductCreated, ProductEvent, ProductRecord,
    RecordMovement, StockMoved, INITIAL_STOCK_NOTE, MAX_PRICE_CENTS, MAX_QUANTITY,
};
pub use stats::{StockStats, LOW_STOCK_THRESHOLD};
