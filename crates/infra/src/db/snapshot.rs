//! Whole-database snapshots: dump every table and rebuild a database from a dump.
//!
//! Restoring re-checks what inserts would have checked (field rules, foreign
//! keys, the unique e-mail). Each table's sequence resumes after the highest id
//! it ever issued, so ids of deleted rows stay retired across a restore.
//! Timestamps are taken from the snapshot as-is.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use storefront_core::{Entity, RecordId};
use storefront_store::{
    Address, Cart, CartItem, Collection, Customer, Order, OrderItem, Product, ProductId,
    Promotion, PromotionId,
};
use storefront_tags::{Tag, TaggedItem};

use super::{Clock, Database, DbError, DbResult, RowKey, SystemClock, Table, Tables};

/// One row of the product/promotion link table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPromotion {
    pub product: ProductId,
    pub promotion: PromotionId,
}

/// Highest id each table has issued. A missing entry falls back to the
/// highest id present in the table's rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sequences {
    pub collections: Option<RecordId>,
    pub products: Option<RecordId>,
    pub promotions: Option<RecordId>,
    pub customers: Option<RecordId>,
    pub addresses: Option<RecordId>,
    pub orders: Option<RecordId>,
    pub order_items: Option<RecordId>,
    pub carts: Option<RecordId>,
    pub cart_items: Option<RecordId>,
    pub tags: Option<RecordId>,
    pub tagged_items: Option<RecordId>,
}

/// Every row of every table, in id order, plus the id sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub collections: Vec<Collection>,
    pub products: Vec<Product>,
    pub promotions: Vec<Promotion>,
    pub product_promotions: Vec<ProductPromotion>,
    pub customers: Vec<Customer>,
    pub addresses: Vec<Address>,
    pub orders: Vec<Order>,
    pub order_items: Vec<OrderItem>,
    pub carts: Vec<Cart>,
    pub cart_items: Vec<CartItem>,
    pub tags: Vec<Tag>,
    pub tagged_items: Vec<TaggedItem>,
    pub sequences: Sequences,
}

impl Snapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn dump<K: RowKey, V: Clone>(table: &Table<K, V>) -> Vec<V> {
    table.values().cloned().collect()
}

fn resume<K: RowKey, V: Clone>(table: &mut Table<K, V>, last: Option<RecordId>) {
    if let Some(last) = last {
        table.resume_after(last);
    }
}

/// Put rows back under their own ids; a repeated id is a unique violation.
fn load<E>(table: &mut Table<E::Id, E>, rows: Vec<E>) -> DbResult<()>
where
    E: Entity + Clone,
    E::Id: RowKey,
{
    for row in rows {
        let id = *row.id();
        if !table.restore(id, row) {
            let id: RecordId = id.into();
            return Err(DbError::UniqueViolation {
                table: E::MODEL,
                column: "id",
                value: id.to_string(),
            });
        }
    }
    Ok(())
}

impl Database {
    pub fn snapshot(&self) -> DbResult<Snapshot> {
        let tables = self.read()?;
        Ok(Snapshot {
            collections: dump(&tables.collections),
            products: dump(&tables.products),
            promotions: dump(&tables.promotions),
            product_promotions: tables
                .product_promotions
                .iter()
                .map(|&(product, promotion)| ProductPromotion { product, promotion })
                .collect(),
            customers: dump(&tables.customers),
            addresses: dump(&tables.addresses),
            orders: dump(&tables.orders),
            order_items: dump(&tables.order_items),
            carts: dump(&tables.carts),
            cart_items: dump(&tables.cart_items),
            tags: dump(&tables.tags),
            tagged_items: dump(&tables.tagged_items),
            sequences: Sequences {
                collections: tables.collections.last_id(),
                products: tables.products.last_id(),
                promotions: tables.promotions.last_id(),
                customers: tables.customers.last_id(),
                addresses: tables.addresses.last_id(),
                orders: tables.orders.last_id(),
                order_items: tables.order_items.last_id(),
                carts: tables.carts.last_id(),
                cart_items: tables.cart_items.last_id(),
                tags: tables.tags.last_id(),
                tagged_items: tables.tagged_items.last_id(),
            },
        })
    }

    /// Rebuild a database from a snapshot, stamping new rows with the wall clock.
    pub fn restore(snapshot: Snapshot) -> DbResult<Self> {
        Self::restore_with_clock(snapshot, Arc::new(SystemClock))
    }

    pub fn restore_with_clock(snapshot: Snapshot, clock: Arc<dyn Clock>) -> DbResult<Self> {
        snapshot.collections.iter().try_for_each(Collection::validate)?;
        snapshot.products.iter().try_for_each(Product::validate)?;
        snapshot.promotions.iter().try_for_each(Promotion::validate)?;
        snapshot.customers.iter().try_for_each(Customer::validate)?;
        snapshot.addresses.iter().try_for_each(Address::validate)?;
        snapshot.order_items.iter().try_for_each(OrderItem::validate)?;
        snapshot.cart_items.iter().try_for_each(CartItem::validate)?;
        snapshot.tags.iter().try_for_each(Tag::validate)?;

        let mut tables = Tables::default();
        load(&mut tables.collections, snapshot.collections)?;
        load(&mut tables.products, snapshot.products)?;
        load(&mut tables.promotions, snapshot.promotions)?;
        tables.product_promotions = snapshot
            .product_promotions
            .into_iter()
            .map(|link| (link.product, link.promotion))
            .collect();
        load(&mut tables.customers, snapshot.customers)?;
        load(&mut tables.addresses, snapshot.addresses)?;
        load(&mut tables.orders, snapshot.orders)?;
        load(&mut tables.order_items, snapshot.order_items)?;
        load(&mut tables.carts, snapshot.carts)?;
        load(&mut tables.cart_items, snapshot.cart_items)?;
        load(&mut tables.tags, snapshot.tags)?;
        load(&mut tables.tagged_items, snapshot.tagged_items)?;

        let seq = snapshot.sequences;
        resume(&mut tables.collections, seq.collections);
        resume(&mut tables.products, seq.products);
        resume(&mut tables.promotions, seq.promotions);
        resume(&mut tables.customers, seq.customers);
        resume(&mut tables.addresses, seq.addresses);
        resume(&mut tables.orders, seq.orders);
        resume(&mut tables.order_items, seq.order_items);
        resume(&mut tables.carts, seq.carts);
        resume(&mut tables.cart_items, seq.cart_items);
        resume(&mut tables.tags, seq.tags);
        resume(&mut tables.tagged_items, seq.tagged_items);

        let customers: Vec<Customer> = dump(&tables.customers);
        for customer in &customers {
            tables.ensure_email_free(&customer.email, None)?;
            tables.index_customer(customer);
        }
        tables.check_integrity()?;

        let counts = tables.counts();
        debug!(?counts, "snapshot restored");
        Ok(Self::from_tables(tables, clock))
    }
}
