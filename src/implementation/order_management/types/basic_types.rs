//! # Order Management Types - Basic Types
//!
//! Identifiers and the status enums with their transition tables.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

// ============================================================================
// BASIC IDENTIFIERS
// ============================================================================

/// Unique order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Cow<'static, str>);

impl OrderId {
    /// Creates a new order ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    /// Generates a new unique order ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Cow::Owned(format!("order-{}", uuid::Uuid::new_v4())))
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// STATUS ENUMS
// ============================================================================

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order placed, not yet worked on.
    #[default]
    Pending,
    /// Being packed.
    Processing,
    /// Handed to the courier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Order cancelled.
    Cancelled,
}

impl OrderStatus {
    /// Whether `next` is a legal successor of this status.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing | Self::Cancelled)
                | (Self::Processing, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }

    /// Whether the customer may still cancel.
    #[must_use]
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether order is in a final state.
    #[must_use]
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Awaiting payment.
    #[default]
    Pending,
    /// Money received.
    Paid,
    /// Payment attempt failed.
    Failed,
    /// Money returned.
    Refunded,
}

impl PaymentStatus {
    /// Whether `next` is a legal successor of this status.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid | Self::Failed)
                | (Self::Failed, Self::Pending | Self::Paid)
                | (Self::Paid, Self::Refunded)
        )
    }

    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Failed => "Failed",
            Self::Refunded => "Refunded",
        }
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash collected by the courier.
    #[default]
    CashOnDelivery,
    /// Card charged through a payment gateway.
    Card,
}

impl PaymentMethod {
    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "Cash on delivery",
            Self::Card => "Card",
        }
    }
}
