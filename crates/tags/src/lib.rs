//! Generic tagging.
//!
//! Tags attach to rows of any entity type through an untyped
//! `(content type, object id)` pair. This crate depends only on
//! `storefront-core`; taggable components never depend on it.

pub mod tag;

/// App label of the tagging tables.
pub const APP_LABEL: &str = "tags";

pub use tag::{NewTag, ObjectRef, Tag, TagId, TaggedItem, TaggedItemId};
