//! Cart item type definition

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::product_catalog::ProductId;

/// Item in the shopping cart: a product reference and a quantity.
///
/// Prices are not cached here; they are read from the catalog when the
/// cart is displayed or checked out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product ID.
    pub product_id: ProductId,
    /// Quantity.
    pub quantity:   u32,
    /// When item was added.
    pub added_at:   DateTime<Utc>,
    /// When item was last updated.
    pub updated_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a new cart item.
    #[must_use]
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        let now = Utc::now();
        Self { product_id, quantity, added_at: now, updated_at: now }
    }

    /// Updates quantity.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.updated_at = Utc::now();
    }
}
