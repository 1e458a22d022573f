//! # Order Management Types - Order Types
//!
//! Line item snapshots and order history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::product_catalog::{Product, ProductId};

use super::basic_types::{OrderStatus, PaymentStatus};

// ============================================================================
// ORDER LINE ITEM
// ============================================================================

/// Line item in an order, copied from the catalog at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    /// Product ID.
    pub product_id: ProductId,
    /// Product name at checkout.
    pub name:       String,
    /// Effective unit price at checkout.
    pub unit_price: u64,
    /// Quantity ordered.
    pub quantity:   u32,
    /// `unit_price * quantity`.
    pub line_total: u64,
    /// Product image URL at checkout.
    pub image_url:  Option<String>,
}

impl OrderLineItem {
    /// Snapshots a product for `quantity` units.
    #[must_use]
    pub fn snapshot(product: &Product, quantity: u32) -> Self {
        let unit_price = product.effective_price();
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price,
            quantity,
            line_total: unit_price.saturating_mul(u64::from(quantity)),
            image_url: product.primary_image().map(str::to_string),
        }
    }
}

// ============================================================================
// ORDER HISTORY
// ============================================================================

/// Order history event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHistoryEvent {
    /// Event type.
    pub event_type:      OrderEventType,
    /// Event description.
    pub description:     String,
    /// Previous status (for status changes).
    pub previous_status: Option<OrderStatus>,
    /// New status (for status changes).
    pub new_status:      Option<OrderStatus>,
    /// Payment status after the event (for payment changes).
    pub payment_status:  Option<PaymentStatus>,
    /// User who triggered the event.
    pub actor:           Option<String>,
    /// Timestamp.
    pub created_at:      DateTime<Utc>,
}

/// Order event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderEventType {
    /// Order created.
    Created,
    /// Status changed.
    StatusChanged,
    /// Payment status changed.
    PaymentUpdated,
    /// Cancelled by the customer.
    Cancelled,
}
