//! Carts and cart items.

use tracing::debug;

use storefront_core::{Entity, validate};
use storefront_store::{Cart, CartId, CartItem, CartItemId, NewCartItem};

use super::{Database, DbError, DbResult, Deleted, require};

impl Database {
    /// Open an empty cart stamped with the current time.
    pub fn insert_cart(&self) -> DbResult<Cart> {
        let created_at = self.now();
        let mut tables = self.write()?;
        let cart = tables.carts.insert_with(|id| Cart { id, created_at })?;
        debug!(table = Cart::MODEL, id = %cart.id, "row inserted");
        Ok(cart)
    }

    pub fn cart(&self, id: CartId) -> DbResult<Option<Cart>> {
        Ok(self.read()?.carts.get(&id).cloned())
    }

    pub fn carts(&self) -> DbResult<Vec<Cart>> {
        Ok(self.read()?.carts.values().cloned().collect())
    }

    /// Removes the cart and its items.
    pub fn delete_cart(&self, id: CartId) -> DbResult<Deleted> {
        let mut tables = self.write()?;
        if !tables.carts.contains(&id) {
            return Err(DbError::not_found::<Cart>(id));
        }

        let mut deleted = Deleted::default();
        deleted.record::<CartItem>(tables.cart_items.remove_where(|i| i.cart == id));
        tables.carts.remove(&id);
        deleted.record::<Cart>(1);
        debug!(table = Cart::MODEL, %id, cascaded = deleted.total() - 1, "row deleted");
        Ok(deleted)
    }

    pub fn insert_cart_item(&self, new: NewCartItem) -> DbResult<CartItem> {
        new.validate()?;
        let mut tables = self.write()?;
        require(&tables.carts, new.cart, CartItem::MODEL, "cart")?;
        require(&tables.products, new.product, CartItem::MODEL, "product")?;

        let item = tables.cart_items.insert_with(|id| CartItem {
            id,
            cart: new.cart,
            product: new.product,
            quantity: new.quantity,
        })?;
        debug!(table = CartItem::MODEL, id = %item.id, "row inserted");
        Ok(item)
    }

    pub fn set_cart_item_quantity(&self, id: CartItemId, quantity: u16) -> DbResult<CartItem> {
        validate::positive_small_int("cart_item.quantity", quantity)?;
        let mut tables = self.write()?;
        let item = tables
            .cart_items
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found::<CartItem>(id))?;
        item.quantity = quantity;
        debug!(table = CartItem::MODEL, %id, quantity, "row updated");
        Ok(item.clone())
    }

    pub fn cart_item(&self, id: CartItemId) -> DbResult<Option<CartItem>> {
        Ok(self.read()?.cart_items.get(&id).cloned())
    }

    pub fn items_for_cart(&self, cart: CartId) -> DbResult<Vec<CartItem>> {
        Ok(self.read()?.cart_items.filter(|i| i.cart == cart))
    }

    pub fn delete_cart_item(&self, id: CartItemId) -> DbResult<Deleted> {
        let mut tables = self.write()?;
        if tables.cart_items.remove(&id).is_none() {
            return Err(DbError::not_found::<CartItem>(id));
        }
        let mut deleted = Deleted::default();
        deleted.record::<CartItem>(1);
        debug!(table = CartItem::MODEL, %id, "row deleted");
        Ok(deleted)
    }
}
