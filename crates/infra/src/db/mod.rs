//! In-memory relational persistence for the storefront model.
//!
//! [`Database`] owns every table behind one lock, so each operation is atomic
//! and operations are serialised. On top of plain row storage it enforces:
//!
//! - foreign keys on insert and update,
//! - delete policies (protect, cascade, set-null),
//! - the unique e-mail constraint and the `(last_name, first_name)` index,
//! - auto-populated timestamps, taken from a [`Clock`].
//!
//! Operations are grouped by area in the submodules.

mod carts;
mod catalog;
mod customers;
mod orders;
mod tagging;

pub mod clock;
pub mod snapshot;
pub mod table;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use storefront_core::{DomainError, Entity, RecordId};
use storefront_store::{
    Address, AddressId, Cart, CartId, CartItem, CartItemId, Collection, CollectionId, Customer,
    CustomerId, Order, OrderId, OrderItem, OrderItemId, Product, ProductId, Promotion, PromotionId,
};
use storefront_tags::{ObjectRef, Tag, TagId, TaggedItem, TaggedItemId};

pub use clock::{Clock, FixedClock, SystemClock};
pub use snapshot::{ProductPromotion, Sequences, Snapshot};
pub use table::{RowKey, Table};

pub type DbResult<T> = Result<T, DbError>;

/// Persistence-layer error. Every variant is returned synchronously to the
/// caller; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DbError {
    #[error("{table} {id} not found")]
    NotFound { table: &'static str, id: RecordId },

    #[error("{table}.{column} references missing row {id}")]
    ForeignKey {
        table: &'static str,
        column: &'static str,
        id: RecordId,
    },

    #[error("duplicate value {value:?} for unique column {table}.{column}")]
    UniqueViolation {
        table: &'static str,
        column: &'static str,
        value: String,
    },

    #[error("cannot delete {table} {id}: still referenced by {count} {referenced_by} row(s)")]
    ProtectedDelete {
        table: &'static str,
        id: RecordId,
        referenced_by: &'static str,
        count: usize,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage error: {0}")]
    Storage(String),
}

impl DbError {
    pub(crate) fn not_found<E: Entity>(id: E::Id) -> Self {
        Self::NotFound {
            table: E::MODEL,
            id: id.into(),
        }
    }
}

/// Rows removed by a delete, per model, including cascades.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Deleted {
    counts: BTreeMap<&'static str, usize>,
}

impl Deleted {
    pub(crate) fn record<E: Entity>(&mut self, rows: usize) {
        if rows > 0 {
            *self.counts.entry(E::MODEL).or_default() += rows;
        }
    }

    /// Rows removed from the given model's table.
    pub fn count(&self, model: &str) -> usize {
        self.counts.get(model).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Row counts per table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub collections: usize,
    pub products: usize,
    pub promotions: usize,
    pub product_promotions: usize,
    pub customers: usize,
    pub addresses: usize,
    pub orders: usize,
    pub order_items: usize,
    pub carts: usize,
    pub cart_items: usize,
    pub tags: usize,
    pub tagged_items: usize,
}

/// Every table plus the secondary indexes.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    pub(crate) collections: Table<CollectionId, Collection>,
    pub(crate) products: Table<ProductId, Product>,
    pub(crate) promotions: Table<PromotionId, Promotion>,
    pub(crate) product_promotions: BTreeSet<(ProductId, PromotionId)>,
    pub(crate) customers: Table<CustomerId, Customer>,
    /// Unique index on `customer.email`.
    pub(crate) customer_emails: HashMap<String, CustomerId>,
    /// Composite index on `(customer.last_name, customer.first_name)`.
    pub(crate) customer_names: BTreeMap<(String, String), BTreeSet<CustomerId>>,
    pub(crate) addresses: Table<AddressId, Address>,
    pub(crate) orders: Table<OrderId, Order>,
    pub(crate) order_items: Table<OrderItemId, OrderItem>,
    pub(crate) carts: Table<CartId, Cart>,
    pub(crate) cart_items: Table<CartItemId, CartItem>,
    pub(crate) tags: Table<TagId, Tag>,
    pub(crate) tagged_items: Table<TaggedItemId, TaggedItem>,
}

/// Fail with a foreign-key error unless `id` names a row of `table`.
pub(crate) fn require<E>(
    table: &Table<E::Id, E>,
    id: E::Id,
    referencing: &'static str,
    column: &'static str,
) -> DbResult<()>
where
    E: Entity + Clone,
    E::Id: RowKey,
{
    if table.contains(&id) {
        Ok(())
    } else {
        Err(DbError::ForeignKey {
            table: referencing,
            column,
            id: id.into(),
        })
    }
}

/// Fail with a protected-delete error if `count` child rows still reference the parent.
pub(crate) fn protect<Parent, Child>(id: Parent::Id, count: usize) -> DbResult<()>
where
    Parent: Entity,
    Child: Entity,
{
    if count == 0 {
        return Ok(());
    }
    let id: RecordId = id.into();
    tracing::warn!(
        table = Parent::MODEL,
        %id,
        referenced_by = Child::MODEL,
        count,
        "protected delete rejected"
    );
    Err(DbError::ProtectedDelete {
        table: Parent::MODEL,
        id,
        referenced_by: Child::MODEL,
        count,
    })
}

impl Tables {
    pub(crate) fn index_customer(&mut self, customer: &Customer) {
        self.customer_emails
            .insert(customer.email.clone(), customer.id);
        self.customer_names
            .entry(customer.name_key())
            .or_default()
            .insert(customer.id);
    }

    pub(crate) fn unindex_customer(&mut self, customer: &Customer) {
        if self.customer_emails.get(&customer.email) == Some(&customer.id) {
            self.customer_emails.remove(&customer.email);
        }
        let key = customer.name_key();
        if let Some(ids) = self.customer_names.get_mut(&key) {
            ids.remove(&customer.id);
            if ids.is_empty() {
                self.customer_names.remove(&key);
            }
        }
    }

    /// Fail if `email` belongs to a customer other than `except`.
    pub(crate) fn ensure_email_free(
        &self,
        email: &str,
        except: Option<CustomerId>,
    ) -> DbResult<()> {
        match self.customer_emails.get(email) {
            Some(owner) if Some(*owner) != except => {
                tracing::warn!(table = Customer::MODEL, column = "email", "unique violation");
                Err(DbError::UniqueViolation {
                    table: Customer::MODEL,
                    column: "email",
                    value: email.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Whether the row a generic reference names exists.
    pub(crate) fn contains_object(&self, target: &ObjectRef) -> bool {
        let id = target.object_id;
        let ct = &target.content_type;
        if ct.is::<Collection>() {
            self.collections.contains(&id.into())
        } else if ct.is::<Product>() {
            self.products.contains(&id.into())
        } else if ct.is::<Promotion>() {
            self.promotions.contains(&id.into())
        } else if ct.is::<Customer>() {
            self.customers.contains(&id.into())
        } else if ct.is::<Address>() {
            self.addresses.contains(&id.into())
        } else if ct.is::<Order>() {
            self.orders.contains(&id.into())
        } else if ct.is::<OrderItem>() {
            self.order_items.contains(&id.into())
        } else if ct.is::<Cart>() {
            self.carts.contains(&id.into())
        } else if ct.is::<CartItem>() {
            self.cart_items.contains(&id.into())
        } else if ct.is::<Tag>() {
            self.tags.contains(&id.into())
        } else if ct.is::<TaggedItem>() {
            self.tagged_items.contains(&id.into())
        } else {
            false
        }
    }

    /// Check every foreign key and unique constraint across all tables.
    pub(crate) fn check_integrity(&self) -> DbResult<()> {
        for c in self.collections.values() {
            if let Some(featured) = c.featured_product {
                require(&self.products, featured, Collection::MODEL, "featured_product")?;
            }
        }
        for p in self.products.values() {
            require(&self.collections, p.collection, Product::MODEL, "collection")?;
        }
        for (product, promotion) in &self.product_promotions {
            require(&self.products, *product, "product_promotions", "product")?;
            require(&self.promotions, *promotion, "product_promotions", "promotion")?;
        }
        let mut emails = BTreeSet::new();
        for c in self.customers.values() {
            if !emails.insert(c.email.as_str()) {
                return Err(DbError::UniqueViolation {
                    table: Customer::MODEL,
                    column: "email",
                    value: c.email.clone(),
                });
            }
        }
        for a in self.addresses.values() {
            require(&self.customers, a.customer, Address::MODEL, "customer")?;
        }
        for o in self.orders.values() {
            require(&self.customers, o.customer, Order::MODEL, "customer")?;
        }
        for i in self.order_items.values() {
            require(&self.orders, i.order, OrderItem::MODEL, "order")?;
            require(&self.products, i.product, OrderItem::MODEL, "product")?;
        }
        for i in self.cart_items.values() {
            require(&self.carts, i.cart, CartItem::MODEL, "cart")?;
            require(&self.products, i.product, CartItem::MODEL, "product")?;
        }
        for t in self.tagged_items.values() {
            require(&self.tags, t.tag, TaggedItem::MODEL, "tag")?;
        }
        Ok(())
    }

    pub(crate) fn counts(&self) -> TableCounts {
        TableCounts {
            collections: self.collections.len(),
            products: self.products.len(),
            promotions: self.promotions.len(),
            product_promotions: self.product_promotions.len(),
            customers: self.customers.len(),
            addresses: self.addresses.len(),
            orders: self.orders.len(),
            order_items: self.order_items.len(),
            carts: self.carts.len(),
            cart_items: self.cart_items.len(),
            tags: self.tags.len(),
            tagged_items: self.tagged_items.len(),
        }
    }
}

/// The storefront database.
#[derive(Debug)]
pub struct Database {
    tables: RwLock<Tables>,
    clock: Arc<dyn Clock>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    /// Empty database stamping rows with the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::from_tables(Tables::default(), clock)
    }

    pub(crate) fn from_tables(tables: Tables, clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: RwLock::new(tables),
            clock,
        }
    }

    pub(crate) fn read(&self) -> DbResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| DbError::Storage("table lock poisoned".to_string()))
    }

    pub(crate) fn write(&self) -> DbResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| DbError::Storage("table lock poisoned".to_string()))
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Whether a generic reference currently resolves to a row.
    ///
    /// Tagged items are never cleaned up when their target goes away; check
    /// with this before dereferencing one.
    pub fn object_exists(&self, target: &ObjectRef) -> DbResult<bool> {
        Ok(self.read()?.contains_object(target))
    }

    pub fn counts(&self) -> DbResult<TableCounts> {
        Ok(self.read()?.counts())
    }
}
