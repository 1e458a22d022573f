//! Shopping cart

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::CommerceError,
    types::{
        context::UserId,
        product_catalog::{Product, ProductId},
    },
};

use super::item::CartItem;
use super::types::{CartId, CartSummary, PricedLine};

/// Shopping cart, one per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID.
    pub id:         CartId,
    /// Owner.
    pub user_id:    UserId,
    /// Items in cart.
    pub items:      Vec<CartItem>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new cart.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self { id: CartId::generate(), user_id, items: Vec::new(), created_at: now, updated_at: now }
    }

    /// Whether cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of unique items.
    #[must_use]
    pub fn unique_item_count(&self) -> usize {
        self.items.len()
    }

    /// Total quantity of all items.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().fold(0u32, |acc, i| acc.saturating_add(i.quantity))
    }

    /// Quantity of one product.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.items.iter().find(|i| &i.product_id == product_id).map_or(0, |i| i.quantity)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Adds an item to the cart.
    ///
    /// If product already exists, increases quantity.
    pub fn add_item(&mut self, product: &Product, quantity: u32) -> Result<(), CommerceError> {
        if quantity == 0 {
            return Err(CommerceError::InvalidQuantity);
        }

        if !product.status.is_purchasable() {
            return Err(CommerceError::ProductNotAvailable(product.id.to_string()));
        }

        let new_qty = self.quantity_of(&product.id).saturating_add(quantity);
        Self::check_stock(product, new_qty)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            item.set_quantity(new_qty);
        } else {
            self.items.push(CartItem::new(product.id.clone(), quantity));
        }

        self.touch();
        Ok(())
    }

    /// Sets an item's quantity.
    ///
    /// Removes the item if quantity is 0 or below.
    pub fn update_item_quantity(
        &mut self, product: &Product, quantity: i64,
    ) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return self.remove_item(&product.id);
        }
        let quantity = u32::try_from(quantity).map_err(|_| CommerceError::InvalidQuantity)?;
        Self::check_stock(product, quantity)?;

        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product.id)
            .ok_or_else(|| CommerceError::ItemNotInCart(product.id.to_string()))?;

        item.set_quantity(quantity);
        self.touch();
        Ok(())
    }

    /// Removes an item from the cart.
    pub fn remove_item(&mut self, product_id: &ProductId) -> Result<(), CommerceError> {
        let initial_len = self.items.len();
        self.items.retain(|i| &i.product_id != product_id);

        if self.items.len() == initial_len {
            return Err(CommerceError::ItemNotInCart(product_id.to_string()));
        }

        self.touch();
        Ok(())
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.touch();
    }

    /// Prices the cart with `lookup`; lines whose product vanished are skipped.
    pub fn summarize(&self, lookup: impl Fn(&ProductId) -> Option<Product>) -> CartSummary {
        let lines: Vec<PricedLine> = self
            .items
            .iter()
            .filter_map(|item| {
                let product = lookup(&item.product_id)?;
                let unit_price = product.effective_price();
                Some(PricedLine {
                    product_id: item.product_id.clone(),
                    name: product.name.clone(),
                    unit_price,
                    quantity: item.quantity,
                    line_total: unit_price.saturating_mul(u64::from(item.quantity)),
                    image_url: product.primary_image().map(str::to_string),
                    available: product.status.is_purchasable() && product.stock >= item.quantity,
                })
            })
            .collect();

        CartSummary {
            subtotal: lines.iter().fold(0u64, |acc, l| acc.saturating_add(l.line_total)),
            item_count: lines.iter().fold(0u32, |acc, l| acc.saturating_add(l.quantity)),
            lines,
        }
    }

    fn check_stock(product: &Product, requested: u32) -> Result<(), CommerceError> {
        if requested > product.stock {
            return Err(CommerceError::InsufficientInventory {
                product_id: product.id.to_string(),
                available:  product.stock,
                requested,
            });
        }
        Ok(())
    }
}
