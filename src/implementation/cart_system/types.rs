//! Core type definitions for the cart system

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::types::product_catalog::ProductId;

/// Unique cart identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartId(pub Cow<'static, str>);

impl CartId {
    /// Creates a new cart ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    /// Generates a new unique cart ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Cow::Owned(format!("cart-{}", uuid::Uuid::new_v4())))
    }
}

impl std::fmt::Display for CartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cart line priced against the live catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedLine {
    /// Product ID.
    pub product_id: ProductId,
    /// Current product name.
    pub name:       String,
    /// Current effective unit price.
    pub unit_price: u64,
    /// Quantity in the cart.
    pub quantity:   u32,
    /// `unit_price * quantity`.
    pub line_total: u64,
    /// Primary image URL.
    pub image_url:  Option<String>,
    /// Whether the product can still be bought in this quantity.
    pub available:  bool,
}

/// Cart view returned to the storefront.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CartSummary {
    /// Priced lines, in cart order.
    pub lines:      Vec<PricedLine>,
    /// Sum of line totals.
    pub subtotal:   u64,
    /// Total units.
    pub item_count: u32,
}

impl CartSummary {
    /// Whether every line can be checked out.
    #[must_use]
    pub fn all_available(&self) -> bool {
        self.lines.iter().all(|l| l.available)
    }
}
