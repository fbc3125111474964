//! Dashboard statistics over the product catalogue.

use serde::{Deserialize, Serialize};

use stockroom_core::Money;

use crate::product::ProductRecord;

/// Products with fewer units than this on hand count as low in stock.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Aggregate figures shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockStats {
    /// Number of distinct products.
    pub total_products: u64,
    /// Sum of units on hand across all products.
    pub total_items: i64,
    /// Sum of `quantity * price` across all products.
    pub total_value: Money,
    /// Number of products below [`LOW_STOCK_THRESHOLD`].
    pub low_stock: u64,
}

impl StockStats {
    pub fn compute<'a, I>(products: I) -> Self
    where
        I: IntoIterator<Item = &'a ProductRecord>,
    {
        products
            .into_iter()
            .fold(StockStats::default(), |mut acc, product| {
                acc.total_products += 1;
                acc.total_items = acc.total_items.saturating_add(product.quantity);
                acc.total_value = acc.total_value.saturating_add(product.stock_value());
                if product.quantity < LOW_STOCK_THRESHOLD {
                    acc.low_stock += 1;
                }
                acc
            })
    }
}
