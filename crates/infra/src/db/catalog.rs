//! Collections, products, promotions and the product-promotion link table.

use tracing::debug;

use storefront_core::Entity;
use storefront_store::{
    CartItem, Collection, CollectionChanges, CollectionId, NewCollection, NewProduct,
    NewPromotion, OrderItem, Product, ProductChanges, ProductId, Promotion, PromotionId,
};

use super::{Database, DbError, DbResult, Deleted, protect, require};

impl Database {
    pub fn insert_collection(&self, new: NewCollection) -> DbResult<Collection> {
        new.validate()?;
        let mut tables = self.write()?;
        if let Some(featured) = new.featured_product {
            require(&tables.products, featured, Collection::MODEL, "featured_product")?;
        }

        let collection = tables.collections.insert_with(|id| Collection {
            id,
            title: new.title,
            featured_product: new.featured_product,
        })?;
        debug!(table = Collection::MODEL, id = %collection.id, "row inserted");
        Ok(collection)
    }

    pub fn update_collection(
        &self,
        id: CollectionId,
        changes: CollectionChanges,
    ) -> DbResult<Collection> {
        changes.validate()?;
        let mut tables = self.write()?;
        if let Some(Some(featured)) = changes.featured_product {
            require(&tables.products, featured, Collection::MODEL, "featured_product")?;
        }

        let collection = tables
            .collections
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found::<Collection>(id))?;
        changes.apply(collection);
        debug!(table = Collection::MODEL, %id, "row updated");
        Ok(collection.clone())
    }

    pub fn collection(&self, id: CollectionId) -> DbResult<Option<Collection>> {
        Ok(self.read()?.collections.get(&id).cloned())
    }

    pub fn collections(&self) -> DbResult<Vec<Collection>> {
        Ok(self.read()?.collections.values().cloned().collect())
    }

    /// The collection's featured product, if it has one.
    pub fn featured_product(&self, id: CollectionId) -> DbResult<Option<Product>> {
        let tables = self.read()?;
        let collection = tables
            .collections
            .get(&id)
            .ok_or_else(|| DbError::not_found::<Collection>(id))?;
        Ok(collection
            .featured_product
            .and_then(|product| tables.products.get(&product).cloned()))
    }

    pub fn products_in_collection(&self, id: CollectionId) -> DbResult<Vec<Product>> {
        Ok(self.read()?.products.filter(|p| p.collection == id))
    }

    /// Rejected while any product still belongs to the collection.
    pub fn delete_collection(&self, id: CollectionId) -> DbResult<Deleted> {
        let mut tables = self.write()?;
        if !tables.collections.contains(&id) {
            return Err(DbError::not_found::<Collection>(id));
        }
        protect::<Collection, Product>(id, tables.products.count_where(|p| p.collection == id))?;

        tables.collections.remove(&id);
        let mut deleted = Deleted::default();
        deleted.record::<Collection>(1);
        debug!(table = Collection::MODEL, %id, "row deleted");
        Ok(deleted)
    }

    pub fn insert_product(&self, new: NewProduct) -> DbResult<Product> {
        new.validate()?;
        let now = self.now();
        let mut tables = self.write()?;
        require(&tables.collections, new.collection, Product::MODEL, "collection")?;

        let product = tables.products.insert_with(|id| Product {
            id,
            title: new.title,
            slug: new.slug,
            description: new.description,
            price: new.price,
            inventory: new.inventory,
            last_update: now,
            collection: new.collection,
        })?;
        debug!(table = Product::MODEL, id = %product.id, "row inserted");
        Ok(product)
    }

    /// Apply a partial update and refresh `last_update`.
    pub fn update_product(&self, id: ProductId, changes: ProductChanges) -> DbResult<Product> {
        changes.validate()?;
        let now = self.now();
        let mut tables = self.write()?;
        if let Some(collection) = changes.collection {
            require(&tables.collections, collection, Product::MODEL, "collection")?;
        }

        let product = tables
            .products
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found::<Product>(id))?;
        changes.apply(product);
        product.last_update = now;
        debug!(table = Product::MODEL, %id, "row updated");
        Ok(product.clone())
    }

    pub fn product(&self, id: ProductId) -> DbResult<Option<Product>> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    pub fn products(&self) -> DbResult<Vec<Product>> {
        Ok(self.read()?.products.values().cloned().collect())
    }

    /// First product (lowest id) with the slug. Slugs are not unique.
    pub fn product_by_slug(&self, slug: &str) -> DbResult<Option<Product>> {
        Ok(self
            .read()?
            .products
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    /// Rejected while order items reference the product. Otherwise removes its
    /// cart items and promotion links and un-features it.
    pub fn delete_product(&self, id: ProductId) -> DbResult<Deleted> {
        let mut guard = self.write()?;
        let tables = &mut *guard;
        if !tables.products.contains(&id) {
            return Err(DbError::not_found::<Product>(id));
        }
        protect::<Product, OrderItem>(id, tables.order_items.count_where(|i| i.product == id))?;

        let mut deleted = Deleted::default();
        deleted.record::<CartItem>(tables.cart_items.remove_where(|i| i.product == id));
        tables.product_promotions.retain(|(product, _)| *product != id);
        for collection in tables.collections.values_mut() {
            if collection.featured_product == Some(id) {
                collection.featured_product = None;
            }
        }
        tables.products.remove(&id);
        deleted.record::<Product>(1);
        debug!(table = Product::MODEL, %id, cascaded = deleted.total() - 1, "row deleted");
        Ok(deleted)
    }

    pub fn insert_promotion(&self, new: NewPromotion) -> DbResult<Promotion> {
        new.validate()?;
        let mut tables = self.write()?;
        let promotion = tables.promotions.insert_with(|id| Promotion {
            id,
            description: new.description,
            discount: new.discount,
        })?;
        debug!(table = Promotion::MODEL, id = %promotion.id, "row inserted");
        Ok(promotion)
    }

    pub fn promotion(&self, id: PromotionId) -> DbResult<Option<Promotion>> {
        Ok(self.read()?.promotions.get(&id).cloned())
    }

    pub fn promotions(&self) -> DbResult<Vec<Promotion>> {
        Ok(self.read()?.promotions.values().cloned().collect())
    }

    /// Removes the promotion and its product links; products are untouched.
    pub fn delete_promotion(&self, id: PromotionId) -> DbResult<Deleted> {
        let mut tables = self.write()?;
        if tables.promotions.remove(&id).is_none() {
            return Err(DbError::not_found::<Promotion>(id));
        }
        tables.product_promotions.retain(|(_, promotion)| *promotion != id);

        let mut deleted = Deleted::default();
        deleted.record::<Promotion>(1);
        debug!(table = Promotion::MODEL, %id, "row deleted");
        Ok(deleted)
    }

    /// Link a product and a promotion. Linking twice is a no-op; returns
    /// whether a new link was created.
    pub fn add_promotion(&self, product: ProductId, promotion: PromotionId) -> DbResult<bool> {
        let mut tables = self.write()?;
        require(&tables.products, product, "product_promotions", "product")?;
        require(&tables.promotions, promotion, "product_promotions", "promotion")?;

        let created = tables.product_promotions.insert((product, promotion));
        if created {
            debug!(%product, %promotion, "promotion linked");
        }
        Ok(created)
    }

    /// Unlink a product and a promotion; returns whether a link existed.
    pub fn remove_promotion(&self, product: ProductId, promotion: PromotionId) -> DbResult<bool> {
        let removed = self.write()?.product_promotions.remove(&(product, promotion));
        if removed {
            debug!(%product, %promotion, "promotion unlinked");
        }
        Ok(removed)
    }

    pub fn promotions_for_product(&self, product: ProductId) -> DbResult<Vec<Promotion>> {
        let tables = self.read()?;
        Ok(tables
            .product_promotions
            .iter()
            .filter(|(p, _)| *p == product)
            .filter_map(|(_, promotion)| tables.promotions.get(promotion).cloned())
            .collect())
    }

    pub fn products_for_promotion(&self, promotion: PromotionId) -> DbResult<Vec<Product>> {
        let tables = self.read()?;
        Ok(tables
            .product_promotions
            .iter()
            .filter(|(_, p)| *p == promotion)
            .filter_map(|(product, _)| tables.products.get(product).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};

    use storefront_core::Price;

    use super::*;
    use crate::db::{Clock, FixedClock};

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()))
    }

    fn new_product(collection: CollectionId, slug: &str) -> NewProduct {
        NewProduct {
            title: "Trail Shoe".to_string(),
            slug: slug.to_string(),
            description: "Grippy sole".to_string(),
            price: Price::from_cents(8999).unwrap(),
            inventory: 12,
            collection,
        }
    }

    #[test]
    fn product_requires_existing_collection() {
        let db = Database::new();
        let missing = CollectionId::from_raw(99).unwrap();

        let err = db.insert_product(new_product(missing, "trail")).unwrap_err();
        assert!(matches!(err, DbError::ForeignKey { table: "product", column: "collection", .. }));
        assert!(db.products().unwrap().is_empty());
    }

    #[test]
    fn product_insert_stamps_last_update_from_clock() {
        let clock = clock();
        let db = Database::with_clock(clock.clone());
        let shoes = db.insert_collection(NewCollection::new("Shoes")).unwrap();

        let product = db.insert_product(new_product(shoes.id, "trail")).unwrap();
        assert_eq!(product.last_update, clock.now());

        clock.advance(Duration::minutes(5));
        let updated = db
            .update_product(
                product.id,
                ProductChanges {
                    inventory: Some(3),
                    ..ProductChanges::default()
                },
            )
            .unwrap();
        assert_eq!(updated.inventory, 3);
        assert_eq!(updated.last_update, product.last_update + Duration::minutes(5));
    }

    #[test]
    fn update_product_rejects_missing_collection_and_keeps_row() {
        let db = Database::new();
        let shoes = db.insert_collection(NewCollection::new("Shoes")).unwrap();
        let product = db.insert_product(new_product(shoes.id, "trail")).unwrap();

        let err = db
            .update_product(
                product.id,
                ProductChanges {
                    title: Some("Renamed".to_string()),
                    collection: Some(CollectionId::from_raw(42).unwrap()),
                    ..ProductChanges::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKey { .. }));
        assert_eq!(db.product(product.id).unwrap().unwrap(), product);
    }

    #[test]
    fn collection_delete_is_protected_by_products() {
        let db = Database::new();
        let shoes = db.insert_collection(NewCollection::new("Shoes")).unwrap();
        let product = db.insert_product(new_product(shoes.id, "trail")).unwrap();

        let err = db.delete_collection(shoes.id).unwrap_err();
        assert!(matches!(
            err,
            DbError::ProtectedDelete { table: "collection", referenced_by: "product", count: 1, .. }
        ));
        assert!(db.collection(shoes.id).unwrap().is_some());

        db.delete_product(product.id).unwrap();
        assert_eq!(db.delete_collection(shoes.id).unwrap().count("collection"), 1);
    }

    #[test]
    fn featured_product_is_resolved_and_cleared_on_delete() {
        let db = Database::new();
        let shoes = db.insert_collection(NewCollection::new("Shoes")).unwrap();
        let product = db.insert_product(new_product(shoes.id, "trail")).unwrap();

        db.update_collection(
            shoes.id,
            CollectionChanges {
                featured_product: Some(Some(product.id)),
                ..CollectionChanges::default()
            },
        )
        .unwrap();
        assert_eq!(db.featured_product(shoes.id).unwrap(), Some(product.clone()));

        db.delete_product(product.id).unwrap();
        assert_eq!(db.collection(shoes.id).unwrap().unwrap().featured_product, None);
        assert_eq!(db.featured_product(shoes.id).unwrap(), None);
    }

    #[test]
    fn featuring_a_missing_product_fails() {
        let db = Database::new();
        let mut new = NewCollection::new("Shoes");
        new.featured_product = Some(ProductId::from_raw(5).unwrap());
        let err = db.insert_collection(new).unwrap_err();
        assert!(matches!(err, DbError::ForeignKey { column: "featured_product", .. }));
    }

    #[test]
    fn promotions_link_both_ways_and_unlink_on_delete() {
        let db = Database::new();
        let shoes = db.insert_collection(NewCollection::new("Shoes")).unwrap();
        let a = db.insert_product(new_product(shoes.id, "a")).unwrap();
        let b = db.insert_product(new_product(shoes.id, "b")).unwrap();
        let spring = db
            .insert_promotion(NewPromotion {
                description: "Spring".to_string(),
                discount: 0.1,
            })
            .unwrap();

        assert!(db.add_promotion(a.id, spring.id).unwrap());
        assert!(!db.add_promotion(a.id, spring.id).unwrap());
        assert!(db.add_promotion(b.id, spring.id).unwrap());

        let ids: Vec<_> = db
            .products_for_promotion(spring.id)
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![a.id, b.id]);
        assert_eq!(db.promotions_for_product(a.id).unwrap(), vec![spring.clone()]);

        db.delete_product(a.id).unwrap();
        assert_eq!(db.products_for_promotion(spring.id).unwrap().len(), 1);

        db.delete_promotion(spring.id).unwrap();
        assert!(db.promotions_for_product(b.id).unwrap().is_empty());
        assert!(db.product(b.id).unwrap().is_some());
    }

    #[test]
    fn product_by_slug_returns_lowest_id() {
        let db = Database::new();
        let shoes = db.insert_collection(NewCollection::new("Shoes")).unwrap();
        let first = db.insert_product(new_product(shoes.id, "dup")).unwrap();
        db.insert_product(new_product(shoes.id, "dup")).unwrap();

        assert_eq!(db.product_by_slug("dup").unwrap().unwrap().id, first.id);
        assert!(db.product_by_slug("none").unwrap().is_none());
    }

    #[test]
    fn deleting_missing_rows_reports_not_found() {
        let db = Database::new();
        let err = db.delete_product(ProductId::from_raw(1).unwrap()).unwrap_err();
        assert!(matches!(err, DbError::NotFound { table: "product", .. }));
        let err = db.delete_promotion(PromotionId::from_raw(1).unwrap()).unwrap_err();
        assert!(matches!(err, DbError::NotFound { table: "promotion", .. }));
    }
}
