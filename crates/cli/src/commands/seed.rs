//! Deterministic demo data covering every table.

use chrono::NaiveDate;
use tracing::info;

use storefront_core::Price;
use storefront_infra::{Database, DbResult};
use storefront_store::{
    CollectionChanges, Membership, NewAddress, NewCartItem, NewCollection, NewCustomer, NewOrder,
    NewProduct, NewPromotion, PaymentStatus, Product,
};
use storefront_tags::NewTag;

const COLLECTIONS: [(&str, &str); 3] = [("Shoes", "shoe"), ("Hats", "hat"), ("Bags", "bag")];

const CUSTOMERS: [(&str, &str, &str, Membership, (i32, u32, u32)); 3] = [
    ("Ada", "Lovelace", "ada@example.com", Membership::Gold, (1815, 12, 10)),
    ("Grace", "Hopper", "grace@example.com", Membership::Silver, (1906, 12, 9)),
    ("Alan", "Turing", "alan@example.com", Membership::Bronze, (1912, 6, 23)),
];

/// Price in cents of the `index`-th product of the `collection`-th collection.
fn demo_price(collection: usize, index: u32) -> DbResult<Price> {
    let cents = 1_999 + i64::from(index % 90) * 1_000 + collection as i64 * 250;
    Ok(Price::from_cents(cents)?)
}

/// Build a database holding `products_per_collection` products in each demo
/// collection plus customers, orders, a cart and tags referencing them.
pub fn demo_database(products_per_collection: u32) -> DbResult<Database> {
    let db = Database::new();

    let mut catalog: Vec<Product> = Vec::new();
    for (c, (title, slug)) in COLLECTIONS.iter().enumerate() {
        let collection = db.insert_collection(NewCollection::new(*title))?;
        for i in 0..products_per_collection {
            let product = db.insert_product(NewProduct {
                title: format!("{title} #{}", i + 1),
                slug: format!("{slug}-{}", i + 1),
                description: format!("Demo item {} of the {title} range.", i + 1),
                price: demo_price(c, i)?,
                inventory: (i % 50) as i32 * 3,
                collection: collection.id,
            })?;
            if i == 0 {
                db.update_collection(
                    collection.id,
                    CollectionChanges {
                        featured_product: Some(Some(product.id)),
                        ..CollectionChanges::default()
                    },
                )?;
            }
            catalog.push(product);
        }
    }

    let spring = db.insert_promotion(NewPromotion {
        description: "Spring sale".to_string(),
        discount: 0.1,
    })?;
    for product in catalog.iter().step_by(2) {
        db.add_promotion(product.id, spring.id)?;
    }

    let featured = db.insert_tag(NewTag::new("featured"))?;
    let vip = db.insert_tag(NewTag::new("vip"))?;
    for collection in db.collections()? {
        if let Some(product) = db.featured_product(collection.id)? {
            db.tag_entity(featured.id, &product)?;
        }
    }

    for (n, (first, last, email, membership, (y, m, d))) in CUSTOMERS.into_iter().enumerate() {
        let mut new = NewCustomer::new(first, last, email, format!("555-01{n:02}"))
            .with_membership(membership);
        if let Some(birth_date) = NaiveDate::from_ymd_opt(y, m, d) {
            new = new.with_birth_date(birth_date);
        }
        let customer = db.insert_customer(new)?;
        db.insert_address(NewAddress {
            street: format!("{} Analytical Way", n + 1),
            city: "London".to_string(),
            zip: format!("N{}", n + 1),
            customer: customer.id,
        })?;
        if membership == Membership::Gold {
            db.tag_entity(vip.id, &customer)?;
        }

        let status = if n == 0 {
            PaymentStatus::Complete
        } else {
            PaymentStatus::Pending
        };
        let order = db.insert_order(NewOrder {
            customer: customer.id,
            payment_status: status,
        })?;
        for (quantity, product) in catalog.iter().skip(n).step_by(3).take(2).enumerate() {
            db.insert_order_item_at_list_price(order.id, product.id, quantity as u32 + 1)?;
        }
    }

    let cart = db.insert_cart()?;
    for product in catalog.iter().take(2) {
        db.insert_cart_item(NewCartItem {
            cart: cart.id,
            product: product.id,
            quantity: 1,
        })?;
    }

    let counts = db.counts()?;
    info!(
        products = counts.products,
        customers = counts.customers,
        orders = counts.orders,
        "demo data seeded"
    );
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_every_table() {
        let db = demo_database(3).unwrap();
        let counts = db.counts().unwrap();
        assert_eq!(counts.collections, 3);
        assert_eq!(counts.products, 9);
        assert_eq!(counts.customers, 3);
        assert_eq!(counts.addresses, 3);
        assert_eq!(counts.orders, 3);
        assert_eq!(counts.order_items, 6);
        assert_eq!(counts.cart_items, 2);
        assert_eq!(counts.tags, 2);
        assert_eq!(counts.tagged_items, 4);
        assert_eq!(counts.product_promotions, 5);
    }

    #[test]
    fn empty_catalog_still_seeds_customers() {
        let db = demo_database(0).unwrap();
        let counts = db.counts().unwrap();
        assert_eq!(counts.products, 0);
        assert_eq!(counts.customers, 3);
        assert_eq!(counts.order_items, 0);
    }

    #[test]
    fn seeded_database_survives_a_snapshot_round_trip() {
        let db = demo_database(2).unwrap();
        let snapshot = db.snapshot().unwrap();
        let restored = Database::restore(snapshot.clone()).unwrap();
        assert_eq!(restored.snapshot().unwrap(), snapshot);
    }
}
