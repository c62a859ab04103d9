//! `storefront-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage concerns): row
//! identifiers, the entity/content-type contract, value objects and field rules.

pub mod entity;
pub mod error;
pub mod id;
pub mod validate;
pub mod value_object;

pub use entity::{ContentType, Entity};
pub use error::{DomainError, DomainResult};
pub use id::RecordId;
pub use value_object::{Price, ValueObject};
