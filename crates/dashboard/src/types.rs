//! Wire types shared by the native and browser builds.

use serde::{Deserialize, Serialize};

use crate::format::{format_currency, format_number};
use crate::regions::Region;

/// Statistics record returned by `GET /api/stats` (matches the API response shape).
///
/// Every field is a JSON number; counts sent as `120.0` render as `120`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub total_products: f64,
    pub total_items: f64,
    pub total_value: f64,
    pub low_stock: f64,
}

impl StatsRecord {
    /// Display text for every region, in [`Region::ALL`] order.
    pub fn render(&self) -> [(Region, String); 4] {
        [
            (Region::TotalProducts, format_number(self.total_products)),
            (Region::TotalItems, format_number(self.total_items)),
            (Region::TotalValue, format_currency(self.total_value)),
            (Region::LowStock, format_number(self.low_stock)),
        ]
    }
}
