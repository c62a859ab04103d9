//! Value objects: equality by value, not identity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. To
/// "modify" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Fixed-point monetary amount with two decimal places and at most six digits.
///
/// Stored in its natural form (`44.99`, not `4499`), so the largest magnitude is
/// `9999.99`. Amounts with more than two significant decimal places are
/// rejected rather than rounded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl ValueObject for Price {}

impl Price {
    pub const DECIMAL_PLACES: u32 = 2;
    pub const MAX_DIGITS: u32 = 6;

    pub fn new(amount: Decimal) -> DomainResult<Self> {
        let normalized = amount.normalize();
        if normalized.scale() > Self::DECIMAL_PLACES {
            return Err(DomainError::validation(format!(
                "price {amount} has more than {} decimal places",
                Self::DECIMAL_PLACES
            )));
        }

        let mut value = normalized;
        value.rescale(Self::DECIMAL_PLACES);

        let limit = Decimal::from(10_i64.pow(Self::MAX_DIGITS - Self::DECIMAL_PLACES));
        if value.abs() >= limit {
            return Err(DomainError::validation(format!(
                "price {amount} has more than {} digits",
                Self::MAX_DIGITS
            )));
        }

        Ok(Self(value))
    }

    /// Build from an amount in cents.
    pub fn from_cents(cents: i64) -> DomainResult<Self> {
        Self::new(Decimal::new(cents, Self::DECIMAL_PLACES))
    }

    pub fn zero() -> Self {
        Self(Decimal::new(0, Self::DECIMAL_PLACES))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl core::str::FromStr for Price {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str_exact(s.trim())
            .map_err(|e| DomainError::validation(format!("price {s:?}: {e}")))?;
        Self::new(amount)
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
