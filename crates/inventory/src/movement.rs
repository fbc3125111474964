use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, MovementId, ProductId};

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementKind {
    /// Goods received; stock goes up.
    In,
    /// Goods issued; stock goes down.
    Out,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::In => "IN",
            MovementKind::Out => "OUT",
        }
    }

    /// Signed stock delta for `quantity` units moving in this direction.
    pub fn signed(&self, quantity: i64) -> i64 {
        match self {
            MovementKind::In => quantity,
            MovementKind::Out => -quantity,
        }
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for MovementKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN" => Ok(MovementKind::In),
            "OUT" => Ok(MovementKind::Out),
            _ => Err(DomainError::validation("movement kind must be IN or OUT")),
        }
    }
}

/// A recorded stock movement (one row of a product's transaction history).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub kind: MovementKind,
    pub quantity: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
