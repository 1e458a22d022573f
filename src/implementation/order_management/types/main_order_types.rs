//! Main order types for the order management system.
//!
//! An order embeds copies of its line items and shipping address; later
//! catalog or address-book edits never reach it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    basic_types::{OrderId, OrderStatus, PaymentMethod, PaymentStatus},
    order_types::{OrderHistoryEvent, OrderLineItem},
};
use crate::{implementation::addresses::ShippingAddress, types::context::UserId};

/// Complete order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    pub id:                OrderId,
    /// Order number (display).
    pub order_number:      String,
    /// Customer, `None` for guest checkouts.
    pub user_id:           Option<UserId>,
    /// Customer email.
    pub customer_email:    String,
    /// Line items.
    pub items:             Vec<OrderLineItem>,
    /// Shipping address.
    pub shipping_address:  ShippingAddress,
    /// Sum of line totals.
    pub subtotal:          u64,
    /// Discount reduction.
    pub discount:          u64,
    /// Applied discount code.
    pub discount_code:     Option<String>,
    /// Shipping cost.
    pub shipping:          u64,
    /// `max(0, subtotal - discount) + shipping`.
    pub total:             u64,
    /// Order status.
    pub status:            OrderStatus,
    /// Payment status.
    pub payment_status:    PaymentStatus,
    /// Payment method.
    pub payment_method:    PaymentMethod,
    /// Gateway reference for card payments.
    pub payment_reference: Option<String>,
    /// Customer note at checkout.
    pub notes:             Option<String>,
    /// Order history.
    pub history:           Vec<OrderHistoryEvent>,
    /// Creation timestamp.
    pub created_at:        DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at:        DateTime<Utc>,
}

/// Money breakdown computed at checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    /// Subtotal.
    pub subtotal: u64,
    /// Discount reduction.
    pub discount: u64,
    /// Shipping cost.
    pub shipping: u64,
    /// Grand total.
    pub total:    u64,
}

impl OrderTotals {
    /// Computes the grand total; the discounted subtotal never drops below 0.
    #[must_use]
    pub fn compute(subtotal: u64, discount: u64, shipping: u64) -> Self {
        Self {
            subtotal,
            discount,
            shipping,
            total: subtotal.saturating_sub(discount).saturating_add(shipping),
        }
    }
}

/// Everything checkout knows about an order before it is numbered.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    /// Customer, `None` for guests.
    pub user_id:           Option<UserId>,
    /// Contact e-mail.
    pub customer_email:    String,
    /// Line snapshots.
    pub items:             Vec<OrderLineItem>,
    /// Address snapshot.
    pub shipping_address:  ShippingAddress,
    /// Money breakdown.
    pub totals:            OrderTotals,
    /// Applied discount code.
    pub discount_code:     Option<String>,
    /// Payment method.
    pub payment_method:    PaymentMethod,
    /// Payment status after authorization.
    pub payment_status:    PaymentStatus,
    /// Gateway reference.
    pub payment_reference: Option<String>,
    /// Customer note.
    pub notes:             Option<String>,
}
