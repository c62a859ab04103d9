//! Storefront catalog & order data model.
//!
//! Plain records with explicit foreign-key id fields, plus the field-level
//! rules each column carries. Relations, delete policies, unique constraints
//! and timestamps are enforced by the persistence layer (`storefront-infra`);
//! this crate does no IO.

pub mod cart;
pub mod catalog;
pub mod customer;
pub mod order;

/// App label shared by every content type in this crate.
pub const APP_LABEL: &str = "store";

pub use cart::{Cart, CartId, CartItem, CartItemId, NewCartItem};
pub use catalog::{
    Collection, CollectionChanges, CollectionId, NewCollection, NewProduct, NewPromotion, Product,
    ProductChanges, ProductId, Promotion, PromotionId,
};
pub use customer::{
    Address, AddressId, Customer, CustomerChanges, CustomerId, Membership, NewAddress, NewCustomer,
};
pub use order::{NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderItemId, PaymentStatus};
