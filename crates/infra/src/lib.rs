//! Infrastructure layer: product persistence.

pub mod store;

pub use store::{
    InMemoryProductStore, PostgresProductStore, ProductStore, StoreError, StoreResult,
};
