//! Orders and order lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, Price, validate};

use crate::APP_LABEL;
use crate::catalog::ProductId;
use crate::customer::CustomerId;

storefront_core::record_id!(
    /// Order identifier.
    OrderId,
    "OrderId"
);
storefront_core::record_id!(
    /// Order item identifier.
    OrderItemId,
    "OrderItemId"
);

/// Payment status of an order, stored as a single-letter code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    #[serde(rename = "P")]
    Pending,
    #[serde(rename = "C")]
    Complete,
    #[serde(rename = "F")]
    Failed,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [
        PaymentStatus::Pending,
        PaymentStatus::Complete,
        PaymentStatus::Failed,
    ];

    pub fn code(self) -> char {
        match self {
            PaymentStatus::Pending => 'P',
            PaymentStatus::Complete => 'C',
            PaymentStatus::Failed => 'F',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Complete => "Complete",
            PaymentStatus::Failed => "Failed",
        }
    }
}

impl TryFrom<char> for PaymentStatus {
    type Error = DomainError;

    fn try_from(code: char) -> Result<Self, Self::Error> {
        PaymentStatus::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or_else(|| DomainError::validation(format!("unknown payment status code {code:?}")))
    }
}

/// An order placed by a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Set once by the persistence layer when the order is created.
    pub placed_at: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    pub customer: CustomerId,
}

impl Entity for Order {
    type Id = OrderId;
    const APP_LABEL: &'static str = APP_LABEL;
    const MODEL: &'static str = "order";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating an order. `placed_at` is never caller-supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer: CustomerId,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

impl NewOrder {
    /// Pending order for a customer.
    pub fn for_customer(customer: CustomerId) -> Self {
        Self {
            customer,
            payment_status: PaymentStatus::default(),
        }
    }
}

/// One order line. `unit_price` is a snapshot taken when the line is written
/// and does not follow later changes to the product's price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order: OrderId,
    pub product: ProductId,
    pub quantity: u32,
    pub unit_price: Price,
}

impl OrderItem {
    pub fn validate(&self) -> DomainResult<()> {
        validate::positive_int("order_item.quantity", self.quantity)
    }
}

impl Entity for OrderItem {
    type Id = OrderItemId;
    const APP_LABEL: &'static str = APP_LABEL;
    const MODEL: &'static str = "orderitem";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating an order item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub order: OrderId,
    pub product: ProductId,
    pub quantity: u32,
    pub unit_price: Price,
}

impl NewOrderItem {
    pub fn validate(&self) -> DomainResult<()> {
        validate::positive_int("order_item.quantity", self.quantity)
    }
}
