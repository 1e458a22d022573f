//! Cart management service

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tracing::debug;

use crate::{
    errors::CommerceError,
    implementation::product_catalog::ProductCatalog,
    types::{
        context::{RequestContext, UserId},
        product_catalog::ProductId,
    },
};

use super::cart::Cart;
use super::types::CartSummary;

/// Cart management service.
///
/// Holds one cart per signed-in user; products are validated and priced
/// against the shared catalog.
#[derive(Debug)]
pub struct CartService {
    /// Carts indexed by owner.
    carts:   Arc<Mutex<HashMap<UserId, Cart>>>,
    /// Catalog used for validation and pricing.
    catalog: Arc<ProductCatalog>,
}

impl CartService {
    /// Creates a new cart service.
    #[must_use]
    pub fn new(catalog: Arc<ProductCatalog>) -> Self {
        Self { carts: Arc::new(Mutex::new(HashMap::new())), catalog }
    }

    /// Gets the caller's cart, creating an empty one on first use.
    pub fn get_or_create_cart(&self, ctx: &RequestContext) -> Result<Cart, CommerceError> {
        let user = ctx.require_user()?;
        let mut carts = self.carts.lock().map_err(|_| CommerceError::LockError)?;
        Ok(carts.entry(user.id.clone()).or_insert_with(|| Cart::new(user.id.clone())).clone())
    }

    /// Adds `quantity` units of a product to the caller's cart.
    pub fn add_item(
        &self, ctx: &RequestContext, product_id: &ProductId, quantity: u32,
    ) -> Result<Cart, CommerceError> {
        let user = ctx.require_user()?;
        let product = self.catalog.get_product(product_id)?;

        let mut carts = self.carts.lock().map_err(|_| CommerceError::LockError)?;
        let cart = carts.entry(user.id.clone()).or_insert_with(|| Cart::new(user.id.clone()));
        cart.add_item(&product, quantity)?;
        debug!(user = %user.id, product = %product_id, quantity, "cart item added");
        Ok(cart.clone())
    }

    /// Sets a line's quantity; zero or below removes the line.
    pub fn update_quantity(
        &self, ctx: &RequestContext, product_id: &ProductId, quantity: i64,
    ) -> Result<Cart, CommerceError> {
        let user = ctx.require_user()?;
        let mut carts = self.carts.lock().map_err(|_| CommerceError::LockError)?;
        let cart = carts
            .get_mut(&user.id)
            .ok_or_else(|| CommerceError::ItemNotInCart(product_id.to_string()))?;

        if quantity <= 0 {
            cart.remove_item(product_id)?;
        } else {
            let product = self.catalog.get_product(product_id)?;
            cart.update_item_quantity(&product, quantity)?;
        }
        Ok(cart.clone())
    }

    /// Removes a line from the caller's cart.
    pub fn remove_item(
        &self, ctx: &RequestContext, product_id: &ProductId,
    ) -> Result<Cart, CommerceError> {
        let user = ctx.require_user()?;
        let mut carts = self.carts.lock().map_err(|_| CommerceError::LockError)?;
        let cart = carts
            .get_mut(&user.id)
            .ok_or_else(|| CommerceError::ItemNotInCart(product_id.to_string()))?;
        cart.remove_item(product_id)?;
        Ok(cart.clone())
    }

    /// Empties the caller's cart.
    pub fn clear_cart(&self, ctx: &RequestContext) -> Result<(), CommerceError> {
        let user = ctx.require_user()?;
        self.clear_for(&user.id)
    }

    /// Empties a user's cart. Used by checkout after an order is stored.
    pub(crate) fn clear_for(&self, user_id: &UserId) -> Result<(), CommerceError> {
        let mut carts = self.carts.lock().map_err(|_| CommerceError::LockError)?;
        if let Some(cart) = carts.get_mut(user_id) {
            cart.clear();
        }
        Ok(())
    }

    /// Prices the caller's cart against the live catalog.
    pub fn cart_summary(&self, ctx: &RequestContext) -> Result<CartSummary, CommerceError> {
        let user = ctx.require_user()?;
        self.summary_for(&user.id)
    }

    /// Prices a user's cart against the live catalog.
    pub(crate) fn summary_for(&self, user_id: &UserId) -> Result<CartSummary, CommerceError> {
        let cart = {
            let carts = self.carts.lock().map_err(|_| CommerceError::LockError)?;
            match carts.get(user_id) {
                Some(cart) => cart.clone(),
                None => return Ok(CartSummary::default()),
            }
        };
        Ok(cart.summarize(|id| self.catalog.get_product(id).ok()))
    }
}
