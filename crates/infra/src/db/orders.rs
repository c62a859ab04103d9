//! Orders and order items.

use tracing::debug;

use storefront_core::Entity;
use storefront_store::{
    Customer, CustomerId, NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderItemId,
    PaymentStatus, Product, ProductId,
};

use super::{Database, DbError, DbResult, Deleted, Tables, protect, require};

impl Database {
    /// Create an order; `placed_at` is taken from the database clock.
    pub fn insert_order(&self, new: NewOrder) -> DbResult<Order> {
        let placed_at = self.now();
        let mut tables = self.write()?;
        require(&tables.customers, new.customer, Order::MODEL, "customer")?;

        let order = tables.orders.insert_with(|id| Order {
            id,
            placed_at,
            payment_status: new.payment_status,
            customer: new.customer,
        })?;
        debug!(table = Order::MODEL, id = %order.id, "row inserted");
        Ok(order)
    }

    pub fn order(&self, id: OrderId) -> DbResult<Option<Order>> {
        Ok(self.read()?.orders.get(&id).cloned())
    }

    pub fn orders(&self) -> DbResult<Vec<Order>> {
        Ok(self.read()?.orders.values().cloned().collect())
    }

    pub fn orders_for_customer(&self, customer: CustomerId) -> DbResult<Vec<Order>> {
        let tables = self.read()?;
        if !tables.customers.contains(&customer) {
            return Err(DbError::not_found::<Customer>(customer));
        }
        Ok(tables.orders.filter(|o| o.customer == customer))
    }

    /// Change the payment status. `placed_at` never changes.
    pub fn set_payment_status(&self, id: OrderId, status: PaymentStatus) -> DbResult<Order> {
        let mut tables = self.write()?;
        let order = tables
            .orders
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found::<Order>(id))?;
        order.payment_status = status;
        debug!(table = Order::MODEL, %id, status = status.label(), "row updated");
        Ok(order.clone())
    }

    /// Rejected while the order has items.
    pub fn delete_order(&self, id: OrderId) -> DbResult<Deleted> {
        let mut tables = self.write()?;
        if !tables.orders.contains(&id) {
            return Err(DbError::not_found::<Order>(id));
        }
        protect::<Order, OrderItem>(id, tables.order_items.count_where(|i| i.order == id))?;

        tables.orders.remove(&id);
        let mut deleted = Deleted::default();
        deleted.record::<Order>(1);
        debug!(table = Order::MODEL, %id, "row deleted");
        Ok(deleted)
    }

    pub fn insert_order_item(&self, new: NewOrderItem) -> DbResult<OrderItem> {
        new.validate()?;
        let mut tables = self.write()?;
        require(&tables.products, new.product, OrderItem::MODEL, "product")?;
        store_order_item(&mut tables, new)
    }

    /// Add a line priced at the product's current price. The price is copied,
    /// so later product price changes do not reach the line.
    pub fn insert_order_item_at_list_price(
        &self,
        order: OrderId,
        product: ProductId,
        quantity: u32,
    ) -> DbResult<OrderItem> {
        let mut tables = self.write()?;
        let unit_price = tables
            .products
            .get(&product)
            .map(|p| p.price)
            .ok_or(DbError::ForeignKey {
                table: OrderItem::MODEL,
                column: "product",
                id: product.into(),
            })?;
        let new = NewOrderItem {
            order,
            product,
            quantity,
            unit_price,
        };
        new.validate()?;
        store_order_item(&mut tables, new)
    }

    pub fn order_item(&self, id: OrderItemId) -> DbResult<Option<OrderItem>> {
        Ok(self.read()?.order_items.get(&id).cloned())
    }

    pub fn items_for_order(&self, order: OrderId) -> DbResult<Vec<OrderItem>> {
        Ok(self.read()?.order_items.filter(|i| i.order == order))
    }

    /// Order lines that reference a product.
    pub fn order_items_for_product(&self, product: ProductId) -> DbResult<Vec<OrderItem>> {
        let tables = self.read()?;
        if !tables.products.contains(&product) {
            return Err(DbError::not_found::<Product>(product));
        }
        Ok(tables.order_items.filter(|i| i.product == product))
    }

    pub fn delete_order_item(&self, id: OrderItemId) -> DbResult<Deleted> {
        let mut tables = self.write()?;
        if tables.order_items.remove(&id).is_none() {
            return Err(DbError::not_found::<OrderItem>(id));
        }
        let mut deleted = Deleted::default();
        deleted.record::<OrderItem>(1);
        debug!(table = OrderItem::MODEL, %id, "row deleted");
        Ok(deleted)
    }
}

/// Insert a line whose product is known to exist, under the caller's guard.
fn store_order_item(tables: &mut Tables, new: NewOrderItem) -> DbResult<OrderItem> {
    require(&tables.orders, new.order, OrderItem::MODEL, "order")?;
    let item = tables.order_items.insert_with(|id| OrderItem {
        id,
        order: new.order,
        product: new.product,
        quantity: new.quantity,
        unit_price: new.unit_price,
    })?;
    debug!(table = OrderItem::MODEL, id = %item.id, "row inserted");
    Ok(item)
}
