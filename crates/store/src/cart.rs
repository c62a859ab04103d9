//! Shopping carts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainResult, Entity, validate};

use crate::APP_LABEL;
use crate::catalog::ProductId;

storefront_core::record_id!(
    /// Cart identifier.
    CartId,
    "CartId"
);
storefront_core::record_id!(
    /// Cart item identifier.
    CartItemId,
    "CartItemId"
);

/// An anonymous cart. Only carries its creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub created_at: DateTime<Utc>,
}

impl Entity for Cart {
    type Id = CartId;
    const APP_LABEL: &'static str = APP_LABEL;
    const MODEL: &'static str = "cart";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A product line in a cart. Goes away with either its cart or its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart: CartId,
    pub product: ProductId,
    pub quantity: u16,
}

impl CartItem {
    pub fn validate(&self) -> DomainResult<()> {
        validate::positive_small_int("cart_item.quantity", self.quantity)
    }
}

impl Entity for CartItem {
    type Id = CartItemId;
    const APP_LABEL: &'static str = APP_LABEL;
    const MODEL: &'static str = "cartitem";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for adding a product line to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub cart: CartId,
    pub product: ProductId,
    pub quantity: u16,
}

impl NewCartItem {
    pub fn validate(&self) -> DomainResult<()> {
        validate::positive_small_int("cart_item.quantity", self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_item_quantity_fits_small_integer() {
        let mut item = NewCartItem {
            cart: CartId::from_raw(1).unwrap(),
            product: ProductId::from_raw(1).unwrap(),
            quantity: 32_767,
        };
        assert!(item.validate().is_ok());
        item.quantity = 32_768;
        assert!(item.validate().is_err());
    }
}
