//! Customer records and their postal addresses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, validate};

use crate::APP_LABEL;

storefront_core::record_id!(
    /// Customer identifier.
    CustomerId,
    "CustomerId"
);
storefront_core::record_id!(
    /// Address identifier.
    AddressId,
    "AddressId"
);

/// Membership tier, stored as a single-letter code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Membership {
    #[default]
    #[serde(rename = "B")]
    Bronze,
    #[serde(rename = "S")]
    Silver,
    #[serde(rename = "G")]
    Gold,
}

impl Membership {
    pub const ALL: [Membership; 3] = [Membership::Bronze, Membership::Silver, Membership::Gold];

    pub fn code(self) -> char {
        match self {
            Membership::Bronze => 'B',
            Membership::Silver => 'S',
            Membership::Gold => 'G',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Membership::Bronze => "Bronze",
            Membership::Silver => "Silver",
            Membership::Gold => "Gold",
        }
    }
}

impl TryFrom<char> for Membership {
    type Error = DomainError;

    fn try_from(code: char) -> Result<Self, Self::Error> {
        Membership::ALL
            .into_iter()
            .find(|m| m.code() == code)
            .ok_or_else(|| DomainError::validation(format!("unknown membership code {code:?}")))
    }
}

/// A registered shopper. E-mail addresses are unique across all customers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub membership: Membership,
}

impl Customer {
    pub fn validate(&self) -> DomainResult<()> {
        validate_customer_fields(&self.first_name, &self.last_name, &self.email, &self.phone)
    }

    /// Key of the `(last_name, first_name)` lookup index.
    pub fn name_key(&self) -> (String, String) {
        (self.last_name.clone(), self.first_name.clone())
    }
}

impl Entity for Customer {
    type Id = CustomerId;
    const APP_LABEL: &'static str = APP_LABEL;
    const MODEL: &'static str = "customer";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub membership: Membership,
}

impl NewCustomer {
    /// Customer with no birth date and the default (bronze) membership.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: phone.into(),
            birth_date: None,
            membership: Membership::default(),
        }
    }

    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    pub fn with_membership(mut self, membership: Membership) -> Self {
        self.membership = membership;
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_customer_fields(&self.first_name, &self.last_name, &self.email, &self.phone)
    }
}

/// Partial update of a customer. `birth_date: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<Option<NaiveDate>>,
    pub membership: Option<Membership>,
}

impl CustomerChanges {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(first_name) = &self.first_name {
            validate::char_field("customer.first_name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            validate::char_field("customer.last_name", last_name)?;
        }
        if let Some(email) = &self.email {
            validate::email("customer.email", email)?;
        }
        if let Some(phone) = &self.phone {
            validate::char_field("customer.phone", phone)?;
        }
        Ok(())
    }

    pub fn apply(self, customer: &mut Customer) {
        if let Some(first_name) = self.first_name {
            customer.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            customer.last_name = last_name;
        }
        if let Some(email) = self.email {
            customer.email = email;
        }
        if let Some(phone) = self.phone {
            customer.phone = phone;
        }
        if let Some(birth_date) = self.birth_date {
            customer.birth_date = birth_date;
        }
        if let Some(membership) = self.membership {
            customer.membership = membership;
        }
    }
}

fn validate_customer_fields(first: &str, last: &str, email: &str, phone: &str) -> DomainResult<()> {
    validate::char_field("customer.first_name", first)?;
    validate::char_field("customer.last_name", last)?;
    validate::email("customer.email", email)?;
    validate::char_field("customer.phone", phone)
}

/// A postal address. A customer may have any number of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub street: String,
    pub city: String,
    pub zip: String,
    pub customer: CustomerId,
}

impl Address {
    pub fn validate(&self) -> DomainResult<()> {
        validate_address_fields(&self.street, &self.city, &self.zip)
    }
}

impl Entity for Address {
    type Id = AddressId;
    const APP_LABEL: &'static str = APP_LABEL;
    const MODEL: &'static str = "address";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
    pub street: String,
    pub city: String,
    pub zip: String,
    pub customer: CustomerId,
}

impl NewAddress {
    pub fn validate(&self) -> DomainResult<()> {
        validate_address_fields(&self.street, &self.city, &self.zip)
    }
}

fn validate_address_fields(street: &str, city: &str, zip: &str) -> DomainResult<()> {
    validate::char_field("address.street", street)?;
    validate::char_field("address.city", city)?;
    validate::char_field("address.zip", zip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_customer_defaults_to_bronze() {
        let c = NewCustomer::new("Ada", "Lovelace", "ada@example.com", "555-0100");
        assert_eq!(c.membership, Membership::Bronze);
        assert_eq!(c.birth_date, None);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn new_customer_rejects_malformed_email() {
        let c = NewCustomer::new("Ada", "Lovelace", "ada.example.com", "555-0100");
        assert!(matches!(c.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn new_customer_requires_names_and_phone() {
        let c = NewCustomer::new("", "Lovelace", "ada@example.com", "555-0100");
        assert!(c.validate().is_err());
        let c = NewCustomer::new("Ada", "Lovelace", "ada@example.com", " ");
        assert!(c.validate().is_err());
    }

    #[test]
    fn membership_codes() {
        for m in Membership::ALL {
            assert_eq!(Membership::try_from(m.code()).unwrap(), m);
        }
        assert!(Membership::try_from('X').is_err());
        assert_eq!(serde_json::to_string(&Membership::Gold).unwrap(), "\"G\"");
        assert_eq!(Membership::Silver.label(), "Silver");
    }

    #[test]
    fn missing_membership_deserializes_as_bronze() {
        let json = r#"{"first_name":"Ada","last_name":"Lovelace","email":"ada@example.com","phone":"1"}"#;
        let c: NewCustomer = serde_json::from_str(json).unwrap();
        assert_eq!(c.membership, Membership::Bronze);
    }

    #[test]
    fn address_requires_all_parts() {
        let a = NewAddress {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            zip: String::new(),
            customer: CustomerId::from_raw(1).unwrap(),
        };
        assert!(a.validate().is_err());
    }
}
