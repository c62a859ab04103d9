//! Customers, the e-mail / name indexes, and addresses.

use tracing::debug;

use storefront_core::Entity;
use storefront_store::{
    Address, AddressId, Customer, CustomerChanges, CustomerId, NewAddress, NewCustomer, Order,
};

use super::{Database, DbError, DbResult, Deleted, protect, require};

impl Database {
    /// Fails with a unique violation if the e-mail is already registered.
    pub fn insert_customer(&self, new: NewCustomer) -> DbResult<Customer> {
        new.validate()?;
        let mut tables = self.write()?;
        tables.ensure_email_free(&new.email, None)?;

        let customer = tables.customers.insert_with(|id| Customer {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            birth_date: new.birth_date,
            membership: new.membership,
        })?;
        tables.index_customer(&customer);
        debug!(table = Customer::MODEL, id = %customer.id, "row inserted");
        Ok(customer)
    }

    /// Apply a partial update, keeping the e-mail and name indexes in step.
    pub fn update_customer(&self, id: CustomerId, changes: CustomerChanges) -> DbResult<Customer> {
        changes.validate()?;
        let mut tables = self.write()?;
        let current = tables
            .customers
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found::<Customer>(id))?;
        if let Some(email) = &changes.email {
            tables.ensure_email_free(email, Some(id))?;
        }

        let mut updated = current.clone();
        changes.apply(&mut updated);
        tables.unindex_customer(&current);
        tables.index_customer(&updated);
        if let Some(row) = tables.customers.get_mut(&id) {
            *row = updated.clone();
        }
        debug!(table = Customer::MODEL, %id, "row updated");
        Ok(updated)
    }

    pub fn customer(&self, id: CustomerId) -> DbResult<Option<Customer>> {
        Ok(self.read()?.customers.get(&id).cloned())
    }

    pub fn customers(&self) -> DbResult<Vec<Customer>> {
        Ok(self.read()?.customers.values().cloned().collect())
    }

    pub fn customer_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        let tables = self.read()?;
        Ok(tables
            .customer_emails
            .get(email)
            .and_then(|id| tables.customers.get(id).cloned()))
    }

    /// Exact `(last_name, first_name)` lookup through the composite index, in id order.
    pub fn customers_by_name(&self, last_name: &str, first_name: &str) -> DbResult<Vec<Customer>> {
        let tables = self.read()?;
        let key = (last_name.to_string(), first_name.to_string());
        Ok(tables
            .customer_names
            .get(&key)
            .into_iter()
            .flatten()
            .filter_map(|id| tables.customers.get(id).cloned())
            .collect())
    }

    /// Prefix scan of the composite index: every customer with the last name,
    /// ordered by first name, then id.
    pub fn customers_by_last_name(&self, last_name: &str) -> DbResult<Vec<Customer>> {
        let tables = self.read()?;
        let start = (last_name.to_string(), String::new());
        Ok(tables
            .customer_names
            .range(start..)
            .take_while(|((last, _), _)| last == last_name)
            .flat_map(|(_, ids)| ids.iter())
            .filter_map(|id| tables.customers.get(id).cloned())
            .collect())
    }

    /// Rejected while the customer has orders. Otherwise removes the customer's
    /// addresses too.
    pub fn delete_customer(&self, id: CustomerId) -> DbResult<Deleted> {
        let mut guard = self.write()?;
        let tables = &mut *guard;
        let customer = tables
            .customers
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found::<Customer>(id))?;
        protect::<Customer, Order>(id, tables.orders.count_where(|o| o.customer == id))?;

        let mut deleted = Deleted::default();
        deleted.record::<Address>(tables.addresses.remove_where(|a| a.customer == id));
        tables.unindex_customer(&customer);
        tables.customers.remove(&id);
        deleted.record::<Customer>(1);
        debug!(table = Customer::MODEL, %id, cascaded = deleted.total() - 1, "row deleted");
        Ok(deleted)
    }

    pub fn insert_address(&self, new: NewAddress) -> DbResult<Address> {
        new.validate()?;
        let mut tables = self.write()?;
        require(&tables.customers, new.customer, Address::MODEL, "customer")?;

        let address = tables.addresses.insert_with(|id| Address {
            id,
            street: new.street,
            city: new.city,
            zip: new.zip,
            customer: new.customer,
        })?;
        debug!(table = Address::MODEL, id = %address.id, "row inserted");
        Ok(address)
    }

    pub fn address(&self, id: AddressId) -> DbResult<Option<Address>> {
        Ok(self.read()?.addresses.get(&id).cloned())
    }

    pub fn addresses_for_customer(&self, customer: CustomerId) -> DbResult<Vec<Address>> {
        Ok(self.read()?.addresses.filter(|a| a.customer == customer))
    }

    pub fn delete_address(&self, id: AddressId) -> DbResult<Deleted> {
        let mut tables = self.write()?;
        if tables.addresses.remove(&id).is_none() {
            return Err(DbError::not_found::<Address>(id));
        }
        let mut deleted = Deleted::default();
        deleted.record::<Address>(1);
        debug!(table = Address::MODEL, %id, "row deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use storefront_store::{Membership, NewOrder};

    use super::*;

    fn ada() -> NewCustomer {
        NewCustomer::new("Ada", "Lovelace", "ada@example.com", "555-0100")
    }

    fn address(customer: CustomerId, street: &str) -> NewAddress {
        NewAddress {
            street: street.to_string(),
            city: "London".to_string(),
            zip: "NW1".to_string(),
            customer,
        }
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let db = Database::new();
        db.insert_customer(ada()).unwrap();

        let twin = NewCustomer::new("Augusta", "King", "ada@example.com", "555-0199");
        let err = db.insert_customer(twin).unwrap_err();
        assert_eq!(
            err,
            DbError::UniqueViolation {
                table: "customer",
                column: "email",
                value: "ada@example.com".to_string(),
            }
        );
        assert_eq!(db.customers().unwrap().len(), 1);
    }

    #[test]
    fn email_uniqueness_is_case_sensitive() {
        let db = Database::new();
        db.insert_customer(ada()).unwrap();
        let shouting = NewCustomer::new("Ada", "Lovelace", "ADA@example.com", "555-0100");
        assert!(db.insert_customer(shouting).is_ok());
    }

    #[test]
    fn update_rechecks_email_and_frees_the_old_one() {
        let db = Database::new();
        let ada = db.insert_customer(ada()).unwrap();
        let grace = db
            .insert_customer(NewCustomer::new("Grace", "Hopper", "grace@example.com", "555-0101"))
            .unwrap();

        let err = db
            .update_customer(
                grace.id,
                CustomerChanges {
                    email: Some("ada@example.com".to_string()),
                    ..CustomerChanges::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        db.update_customer(
            ada.id,
            CustomerChanges {
                email: Some("countess@example.com".to_string()),
                ..CustomerChanges::default()
            },
        )
        .unwrap();
        assert!(db.customer_by_email("ada@example.com").unwrap().is_none());
        assert_eq!(db.customer_by_email("countess@example.com").unwrap().unwrap().id, ada.id);

        // The freed address can now be taken by someone else.
        db.update_customer(
            grace.id,
            CustomerChanges {
                email: Some("ada@example.com".to_string()),
                ..CustomerChanges::default()
            },
        )
        .unwrap();
    }

    #[test]
    fn keeping_own_email_on_update_is_allowed() {
        let db = Database::new();
        let ada = db.insert_customer(ada()).unwrap();
        let updated = db
            .update_customer(
                ada.id,
                CustomerChanges {
                    email: Some("ada@example.com".to_string()),
                    membership: Some(Membership::Gold),
                    ..CustomerChanges::default()
                },
            )
            .unwrap();
        assert_eq!(updated.membership, Membership::Gold);
    }

    #[test]
    fn name_index_follows_inserts_updates_and_deletes() {
        let db = Database::new();
        let ada = db.insert_customer(ada()).unwrap();
        let byron = db
            .insert_customer(NewCustomer::new("Byron", "Lovelace", "byron@example.com", "1"))
            .unwrap();
        let ada2 = db
            .insert_customer(NewCustomer::new("Ada", "Lovelace", "ada2@example.com", "2"))
            .unwrap();

        let same_name: Vec<_> = db
            .customers_by_name("Lovelace", "Ada")
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(same_name, vec![ada.id, ada2.id]);

        let family: Vec<_> = db
            .customers_by_last_name("Lovelace")
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(family, vec![ada.id, ada2.id, byron.id]);

        db.update_customer(
            ada2.id,
            CustomerChanges {
                last_name: Some("King".to_string()),
                ..CustomerChanges::default()
            },
        )
        .unwrap();
        assert_eq!(db.customers_by_name("Lovelace", "Ada").unwrap().len(), 1);
        assert_eq!(db.customers_by_name("King", "Ada").unwrap()[0].id, ada2.id);

        db.delete_customer(ada.id).unwrap();
        assert!(db.customers_by_name("Lovelace", "Ada").unwrap().is_empty());
        assert!(db.customers_by_last_name("Lovelaces").unwrap().is_empty());
    }

    #[test]
    fn deleting_customer_cascades_addresses() {
        let db = Database::new();
        let ada = db.insert_customer(ada()).unwrap();
        let grace = db
            .insert_customer(NewCustomer::new("Grace", "Hopper", "grace@example.com", "1"))
            .unwrap();
        db.insert_address(address(ada.id, "12 St James's Sq")).unwrap();
        db.insert_address(address(ada.id, "Ockham Park")).unwrap();
        let kept = db.insert_address(address(grace.id, "Arlington")).unwrap();

        let deleted = db.delete_customer(ada.id).unwrap();
        assert_eq!(deleted.count("customer"), 1);
        assert_eq!(deleted.count("address"), 2);
        assert!(db.addresses_for_customer(ada.id).unwrap().is_empty());
        assert_eq!(db.addresses_for_customer(grace.id).unwrap(), vec![kept]);
        assert!(db.customer_by_email("ada@example.com").unwrap().is_none());
    }

    #[test]
    fn customer_with_orders_cannot_be_deleted() {
        let db = Database::new();
        let ada = db.insert_customer(ada()).unwrap();
        db.insert_address(address(ada.id, "Ockham Park")).unwrap();
        db.insert_order(NewOrder::for_customer(ada.id)).unwrap();

        let err = db.delete_customer(ada.id).unwrap_err();
        assert!(matches!(
            err,
            DbError::ProtectedDelete { table: "customer", referenced_by: "order", count: 1, .. }
        ));
        // Nothing was cascaded either.
        assert_eq!(db.addresses_for_customer(ada.id).unwrap().len(), 1);
        assert!(db.customer(ada.id).unwrap().is_some());
    }

    #[test]
    fn address_requires_existing_customer() {
        let db = Database::new();
        let err = db
            .insert_address(address(CustomerId::from_raw(3).unwrap(), "Nowhere"))
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKey { table: "address", column: "customer", .. }));
    }

    #[test]
    fn invalid_customer_fields_surface_as_domain_errors() {
        let db = Database::new();
        let err = db
            .insert_customer(NewCustomer::new("Ada", "Lovelace", "not-an-email", "1"))
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(_)));
    }
}
