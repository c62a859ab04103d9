//! Catalog records: collections, products and promotions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, Price, validate};

use crate::APP_LABEL;

storefront_core::record_id!(
    /// Collection identifier.
    CollectionId,
    "CollectionId"
);
storefront_core::record_id!(
    /// Product identifier.
    ProductId,
    "ProductId"
);
storefront_core::record_id!(
    /// Promotion identifier.
    PromotionId,
    "PromotionId"
);

/// A category of products.
///
/// The featured product is a plain optional id. Products never point back at
/// the collection featuring them; resolve that direction with a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub title: String,
    pub featured_product: Option<ProductId>,
}

impl Collection {
    pub fn validate(&self) -> DomainResult<()> {
        validate::char_field("collection.title", &self.title)
    }
}

impl Entity for Collection {
    type Id = CollectionId;
    const APP_LABEL: &'static str = APP_LABEL;
    const MODEL: &'static str = "collection";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCollection {
    pub title: String,
    pub featured_product: Option<ProductId>,
}

impl NewCollection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            featured_product: None,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate::char_field("collection.title", &self.title)
    }
}

/// Partial update of a collection. `featured_product: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionChanges {
    pub title: Option<String>,
    pub featured_product: Option<Option<ProductId>>,
}

impl CollectionChanges {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(title) = &self.title {
            validate::char_field("collection.title", title)?;
        }
        Ok(())
    }

    pub fn apply(self, collection: &mut Collection) {
        if let Some(title) = self.title {
            collection.title = title;
        }
        if let Some(featured) = self.featured_product {
            collection.featured_product = featured;
        }
    }
}

/// A sellable product. Belongs to exactly one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub price: Price,
    pub inventory: i32,
    /// Refreshed by the persistence layer on every write.
    pub last_update: DateTime<Utc>,
    pub collection: CollectionId,
}

impl Product {
    pub fn validate(&self) -> DomainResult<()> {
        validate_product_text(&self.title, &self.slug)
    }
}

impl Entity for Product {
    type Id = ProductId;
    const APP_LABEL: &'static str = APP_LABEL;
    const MODEL: &'static str = "product";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a product. `last_update` is never caller-supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub price: Price,
    pub inventory: i32,
    pub collection: CollectionId,
}

impl NewProduct {
    pub fn validate(&self) -> DomainResult<()> {
        validate_product_text(&self.title, &self.slug)
    }
}

/// Partial update of a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub inventory: Option<i32>,
    pub collection: Option<CollectionId>,
}

impl ProductChanges {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(title) = &self.title {
            validate::char_field("product.title", title)?;
        }
        if let Some(slug) = &self.slug {
            validate::slug("product.slug", slug)?;
        }
        Ok(())
    }

    pub fn apply(self, product: &mut Product) {
        if let Some(title) = self.title {
            product.title = title;
        }
        if let Some(slug) = self.slug {
            product.slug = slug;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(inventory) = self.inventory {
            product.inventory = inventory;
        }
        if let Some(collection) = self.collection {
            product.collection = collection;
        }
    }
}

fn validate_product_text(title: &str, slug: &str) -> DomainResult<()> {
    validate::char_field("product.title", title)?;
    validate::slug("product.slug", slug)
}

/// A discount campaign applying to any number of products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: PromotionId,
    pub description: String,
    /// Discount factor. Not applied anywhere in the model.
    pub discount: f64,
}

impl Promotion {
    pub fn validate(&self) -> DomainResult<()> {
        validate_discount(self.discount)
    }
}

impl Entity for Promotion {
    type Id = PromotionId;
    const APP_LABEL: &'static str = APP_LABEL;
    const MODEL: &'static str = "promotion";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPromotion {
    pub description: String,
    pub discount: f64,
}

impl NewPromotion {
    pub fn validate(&self) -> DomainResult<()> {
        validate_discount(self.discount)
    }
}

fn validate_discount(discount: f64) -> DomainResult<()> {
    if !discount.is_finite() {
        return Err(DomainError::validation("promotion.discount must be a finite number"));
    }
    Ok(())
}
