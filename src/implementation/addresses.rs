//! # Address Book
//!
//! Saved customer addresses. Each user has at most one default address.

use std::{
    borrow::Cow,
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::CommerceError,
    types::context::{RequestContext, UserId},
};

/// Address identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressId(pub Cow<'static, str>);

impl AddressId {
    /// Creates a new address ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    /// Generates a new unique address ID.
    #[must_use]
    pub fn generate() -> Self {
        Self::new(format!("addr-{}", uuid::Uuid::new_v4()))
    }
}

impl std::fmt::Display for AddressId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shipping address copied into an order at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Recipient name.
    pub full_name:     String,
    /// Contact phone.
    pub phone:         String,
    /// Address line 1.
    pub address_line1: String,
    /// Address line 2.
    pub address_line2: Option<String>,
    /// City.
    pub city:          String,
    /// State/province.
    pub state:         Option<String>,
    /// Postal/ZIP code.
    pub postal_code:   String,
    /// Country code (ISO 3166-1 alpha-2).
    pub country:       String,
}

impl ShippingAddress {
    /// Creates a new shipping address.
    #[must_use]
    pub fn new(
        full_name: impl Into<String>, phone: impl Into<String>, address_line1: impl Into<String>,
        city: impl Into<String>, postal_code: impl Into<String>, country: impl Into<String>,
    ) -> Self {
        Self {
            full_name:     full_name.into(),
            phone:         phone.into(),
            address_line1: address_line1.into(),
            address_line2: None,
            city:          city.into(),
            state:         None,
            postal_code:   postal_code.into(),
            country:       country.into(),
        }
    }

    /// Checks that the fields needed for delivery are present.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let required = [
            ("full name", &self.full_name),
            ("phone", &self.phone),
            ("address line", &self.address_line1),
            ("city", &self.city),
            ("country", &self.country),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(CommerceError::ValidationError(format!("{} is required", field)));
        }
        Ok(())
    }

    /// Single-line rendering used in e-mails.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut parts: Vec<&str> = vec![self.address_line1.as_str()];
        if let Some(line2) = &self.address_line2 {
            parts.push(line2.as_str());
        }
        parts.push(self.city.as_str());
        if let Some(state) = &self.state {
            parts.push(state.as_str());
        }
        parts.push(self.postal_code.as_str());
        parts.push(self.country.as_str());
        parts.into_iter().filter(|p| !p.is_empty()).collect::<Vec<_>>().join(", ")
    }
}

/// Saved address owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Address ID.
    pub id:         AddressId,
    /// Owner.
    pub user_id:    UserId,
    /// Address fields.
    pub details:    ShippingAddress,
    /// Whether this is the owner's default address.
    pub is_default: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Address {
    /// Value copy for embedding in an order.
    #[must_use]
    pub fn snapshot(&self) -> ShippingAddress {
        self.details.clone()
    }
}

/// Saved-address service.
#[derive(Debug, Default)]
pub struct AddressBook {
    addresses: Arc<Mutex<HashMap<AddressId, Address>>>,
}

impl AddressBook {
    /// Creates an empty address book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The caller's addresses, default first, then newest first.
    pub fn list_addresses(&self, ctx: &RequestContext) -> Result<Vec<Address>, CommerceError> {
        let user = ctx.require_user()?;
        let addresses = self.addresses.lock().map_err(|_| CommerceError::LockError)?;

        let mut own: Vec<Address> =
            addresses.values().filter(|a| a.user_id == user.id).cloned().collect();
        own.sort_by(|a, b| b.is_default.cmp(&a.is_default).then(b.created_at.cmp(&a.created_at)));
        Ok(own)
    }

    /// Saves a new address. The first address becomes the default.
    pub fn add_address(
        &self, ctx: &RequestContext, details: ShippingAddress, make_default: bool,
    ) -> Result<Address, CommerceError> {
        let user = ctx.require_user()?;
        details.validate()?;
        let mut addresses = self.addresses.lock().map_err(|_| CommerceError::LockError)?;

        let has_any = addresses.values().any(|a| a.user_id == user.id);
        let address = Address {
            id: AddressId::generate(),
            user_id: user.id.clone(),
            details,
            is_default: make_default || !has_any,
            created_at: Utc::now(),
        };

        if address.is_default {
            Self::clear_default(&mut addresses, &user.id);
        }
        addresses.insert(address.id.clone(), address.clone());
        Ok(address)
    }

    /// Replaces an address's fields; `make_default` promotes it.
    pub fn update_address(
        &self, ctx: &RequestContext, id: &AddressId, details: ShippingAddress, make_default: bool,
    ) -> Result<Address, CommerceError> {
        let user = ctx.require_user()?;
        details.validate()?;
        let mut addresses = self.addresses.lock().map_err(|_| CommerceError::LockError)?;

        Self::owned(&addresses, &user.id, id)?;
        if make_default {
            Self::clear_default(&mut addresses, &user.id);
        }
        let address =
            addresses.get_mut(id).ok_or_else(|| CommerceError::AddressNotFound(id.to_string()))?;
        address.details = details;
        if make_default {
            address.is_default = true;
        }
        Ok(address.clone())
    }

    /// Deletes an address. Removing the default promotes the newest remaining one.
    pub fn remove_address(
        &self, ctx: &RequestContext, id: &AddressId,
    ) -> Result<Address, CommerceError> {
        let user = ctx.require_user()?;
        let mut addresses = self.addresses.lock().map_err(|_| CommerceError::LockError)?;

        Self::owned(&addresses, &user.id, id)?;
        let removed =
            addresses.remove(id).ok_or_else(|| CommerceError::AddressNotFound(id.to_string()))?;

        if removed.is_default {
            if let Some(next) = addresses
                .values_mut()
                .filter(|a| a.user_id == user.id)
                .max_by_key(|a| a.created_at)
            {
                next.is_default = true;
            }
        }
        Ok(removed)
    }

    /// Makes an address the caller's only default.
    pub fn set_default(
        &self, ctx: &RequestContext, id: &AddressId,
    ) -> Result<Address, CommerceError> {
        let user = ctx.require_user()?;
        let mut addresses = self.addresses.lock().map_err(|_| CommerceError::LockError)?;

        Self::owned(&addresses, &user.id, id)?;
        Self::clear_default(&mut addresses, &user.id);
        let address =
            addresses.get_mut(id).ok_or_else(|| CommerceError::AddressNotFound(id.to_string()))?;
        address.is_default = true;
        Ok(address.clone())
    }

    /// The caller's default address, if any.
    pub fn default_address(&self, ctx: &RequestContext) -> Result<Option<Address>, CommerceError> {
        let user = ctx.require_user()?;
        let addresses = self.addresses.lock().map_err(|_| CommerceError::LockError)?;
        Ok(addresses.values().find(|a| a.user_id == user.id && a.is_default).cloned())
    }

    /// Gets one of the caller's addresses.
    pub fn get_address(&self, ctx: &RequestContext, id: &AddressId) -> Result<Address, CommerceError> {
        let user = ctx.require_user()?;
        let addresses = self.addresses.lock().map_err(|_| CommerceError::LockError)?;
        Self::owned(&addresses, &user.id, id).cloned()
    }

    // Another user's address reads as missing.
    fn owned<'a>(
        addresses: &'a HashMap<AddressId, Address>, user_id: &UserId, id: &AddressId,
    ) -> Result<&'a Address, CommerceError> {
        addresses
            .get(id)
            .filter(|a| &a.user_id == user_id)
            .ok_or_else(|| CommerceError::AddressNotFound(id.to_string()))
    }

    fn clear_default(addresses: &mut HashMap<AddressId, Address>, user_id: &UserId) {
        for address in addresses.values_mut().filter(|a| &a.user_id == user_id) {
            address.is_default = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(id: &str) -> RequestContext {
        RequestContext::customer(UserId::new(id), format!("{id}@shop.test"), id)
    }

    fn details(line: &str) -> ShippingAddress {
        ShippingAddress::new("Rina Akter", "01700000000", line, "Dhaka", "1207", "BD")
    }

    fn defaults(book: &AddressBook, ctx: &RequestContext) -> usize {
        book.list_addresses(ctx).expect("list").iter().filter(|a| a.is_default).count()
    }

    #[test]
    fn test_first_address_becomes_default() {
        let book = AddressBook::new();
        let ctx = customer("u1");

        let first = book.add_address(&ctx, details("House 1"), false).expect("add");
        assert!(first.is_default);

        let second = book.add_address(&ctx, details("House 2"), false).expect("add");
        assert!(!second.is_default);
        assert_eq!(defaults(&book, &ctx), 1);
    }

    #[test]
    fn test_set_default_leaves_exactly_one() {
        let book = AddressBook::new();
        let ctx = customer("u1");
        book.add_address(&ctx, details("House 1"), false).expect("a");
        let b = book.add_address(&ctx, details("House 2"), false).expect("b");
        book.add_address(&ctx, details("House 3"), true).expect("c");

        book.set_default(&ctx, &b.id).expect("set default");

        assert_eq!(defaults(&book, &ctx), 1);
        let default = book.default_address(&ctx).expect("default").expect("some");
        assert_eq!(default.id, b.id);
    }

    #[test]
    fn test_defaults_are_per_user() {
        let book = AddressBook::new();
        let u1 = customer("u1");
        let u2 = customer("u2");
        book.add_address(&u1, details("A"), true).expect("u1");
        book.add_address(&u2, details("B"), true).expect("u2");

        assert_eq!(defaults(&book, &u1), 1);
        assert_eq!(defaults(&book, &u2), 1);
    }

    #[test]
    fn test_remove_twice_is_not_found() {
        let book = AddressBook::new();
        let ctx = customer("u1");
        let address = book.add_address(&ctx, details("House 1"), false).expect("add");

        book.remove_address(&ctx, &address.id).expect("first remove");
        let again = book.remove_address(&ctx, &address.id);
        assert!(matches!(again, Err(CommerceError::AddressNotFound(_))));
    }

    #[test]
    fn test_removing_default_promotes_another() {
        let book = AddressBook::new();
        let ctx = customer("u1");
        let first = book.add_address(&ctx, details("House 1"), false).expect("a");
        book.add_address(&ctx, details("House 2"), false).expect("b");

        book.remove_address(&ctx, &first.id).expect("remove");
        assert_eq!(defaults(&book, &ctx), 1);
    }

    #[test]
    fn test_other_users_address_is_not_found() {
        let book = AddressBook::new();
        let owner = customer("u1");
        let address = book.add_address(&owner, details("House 1"), false).expect("add");

        let result = book.remove_address(&customer("u2"), &address.id);
        assert!(matches!(result, Err(CommerceError::AddressNotFound(_))));
        assert_eq!(book.list_addresses(&owner).expect("list").len(), 1);
    }

    #[test]
    fn test_update_with_default_flag() {
        let book = AddressBook::new();
        let ctx = customer("u1");
        book.add_address(&ctx, details("House 1"), false).expect("a");
        let b = book.add_address(&ctx, details("House 2"), false).expect("b");

        let updated = book.update_address(&ctx, &b.id, details("House 2B"), true).expect("update");
        assert_eq!(updated.details.address_line1, "House 2B");
        assert!(updated.is_default);
        assert_eq!(defaults(&book, &ctx), 1);
    }

    #[test]
    fn test_missing_fields_rejected() {
        let book = AddressBook::new();
        let mut incomplete = details("House 1");
        incomplete.city = " ".to_string();
        let result = book.add_address(&customer("u1"), incomplete, false);
        assert_eq!(result, Err(CommerceError::ValidationError("city is required".to_string())));
    }

    #[test]
    fn test_guest_has_no_address_book() {
        let book = AddressBook::new();
        assert_eq!(book.list_addresses(&RequestContext::guest()), Err(CommerceError::NotAuthenticated));
    }

    #[test]
    fn test_one_line_rendering() {
        let mut address = details("House 1");
        address.address_line2 = Some("Road 5".to_string());
        assert_eq!(address.one_line(), "House 1, Road 5, Dhaka, 1207, BD");
    }
}
