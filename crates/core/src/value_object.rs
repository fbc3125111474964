//! Value objects: equality by value, not identity.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Non-negative amount of money in the smallest currency unit (cents).
///
/// Prices and valuations are kept as integer cents so sums stay exact; the
/// float form only exists at the JSON boundary.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Convert a decimal amount (e.g. `12.5`) into cents, rounding to the
    /// nearest cent.
    pub fn from_major(amount: f64) -> DomainResult<Self> {
        if !amount.is_finite() {
            return Err(DomainError::validation("amount must be a finite number"));
        }
        if amount < 0.0 {
            return Err(DomainError::validation("amount cannot be negative"));
        }
        let cents = (amount * 100.0).round();
        if cents > u64::MAX as f64 {
            return Err(DomainError::validation("amount is too large"));
        }
        Ok(Self(cents as u64))
    }

    pub fn cents(&self) -> u64 {
        self.0
    }

    pub fn to_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `self * quantity`, saturating. Negative quantities count as zero.
    pub fn times(&self, quantity: i64) -> Money {
        if quantity <= 0 {
            return Money::ZERO;
        }
        Money(self.0.saturating_mul(quantity as u64))
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl core::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}
