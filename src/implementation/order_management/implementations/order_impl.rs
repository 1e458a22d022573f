//! Order implementation.
//!
//! Construction from a checkout draft and the guarded status changes.

use chrono::{DateTime, Utc};

use super::super::types::{
    basic_types::{OrderId, OrderStatus, PaymentStatus},
    main_order_types::{Order, OrderDraft},
    order_types::{OrderEventType, OrderHistoryEvent},
};
use crate::{errors::CommerceError, types::context::UserId};

impl Order {
    /// Creates a pending order from a checkout draft.
    #[must_use]
    pub fn from_draft(draft: OrderDraft, order_number: String, now: DateTime<Utc>) -> Self {
        let mut order = Self {
            id: OrderId::generate(),
            order_number,
            user_id: draft.user_id,
            customer_email: draft.customer_email,
            items: draft.items,
            shipping_address: draft.shipping_address,
            subtotal: draft.totals.subtotal,
            discount: draft.totals.discount,
            discount_code: draft.discount_code,
            shipping: draft.totals.shipping,
            total: draft.totals.total,
            status: OrderStatus::Pending,
            payment_status: draft.payment_status,
            payment_method: draft.payment_method,
            payment_reference: draft.payment_reference,
            notes: draft.notes,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        order.history.push(OrderHistoryEvent {
            event_type:      OrderEventType::Created,
            description:     "Order created".to_string(),
            previous_status: None,
            new_status:      Some(OrderStatus::Pending),
            payment_status:  Some(order.payment_status),
            actor:           order.user_id.as_ref().map(ToString::to_string),
            created_at:      now,
        });

        order
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().fold(0u32, |acc, i| acc.saturating_add(i.quantity))
    }

    /// Whether `user_id` placed this order.
    #[must_use]
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.user_id.as_ref() == Some(user_id)
    }

    /// Whether the customer may still cancel.
    #[must_use]
    pub fn can_cancel(&self) -> bool {
        self.status.is_cancellable()
    }

    /// Moves to `next` if the transition table allows it.
    ///
    /// # Errors
    /// `InvalidStatusTransition` for same-state writes and illegal moves.
    pub fn transition_status(
        &mut self, next: OrderStatus, actor: Option<String>,
    ) -> Result<(), CommerceError> {
        let previous = self.status;
        if !previous.can_transition_to(next) {
            return Err(CommerceError::InvalidStatusTransition {
                from: previous.display_name().to_string(),
                to:   next.display_name().to_string(),
            });
        }

        self.status = next;
        self.touch();
        self.history.push(OrderHistoryEvent {
            event_type: OrderEventType::StatusChanged,
            description: format!(
                "Status changed from {} to {}",
                previous.display_name(),
                next.display_name()
            ),
            previous_status: Some(previous),
            new_status: Some(next),
            payment_status: None,
            actor,
            created_at: self.updated_at,
        });
        Ok(())
    }

    /// Moves the payment status to `next` if allowed.
    pub fn transition_payment(
        &mut self, next: PaymentStatus, actor: Option<String>,
    ) -> Result<(), CommerceError> {
        let previous = self.payment_status;
        if !previous.can_transition_to(next) {
            return Err(CommerceError::InvalidStatusTransition {
                from: previous.display_name().to_string(),
                to:   next.display_name().to_string(),
            });
        }

        self.payment_status = next;
        self.touch();
        self.history.push(OrderHistoryEvent {
            event_type: OrderEventType::PaymentUpdated,
            description: format!(
                "Payment changed from {} to {}",
                previous.display_name(),
                next.display_name()
            ),
            previous_status: None,
            new_status: None,
            payment_status: Some(next),
            actor,
            created_at: self.updated_at,
        });
        Ok(())
    }

    /// Cancels a pending order on the customer's request.
    pub fn cancel(
        &mut self, reason: Option<&str>, actor: Option<String>,
    ) -> Result<(), CommerceError> {
        if !self.can_cancel() {
            return Err(CommerceError::OrderNotCancellable(self.order_number.clone()));
        }

        let previous = self.status;
        self.status = OrderStatus::Cancelled;
        self.touch();
        self.history.push(OrderHistoryEvent {
            event_type: OrderEventType::Cancelled,
            description: match reason {
                Some(reason) => format!("Cancelled by customer: {reason}"),
                None => "Cancelled by customer".to_string(),
            },
            previous_status: Some(previous),
            new_status: Some(OrderStatus::Cancelled),
            payment_status: None,
            actor,
            created_at: self.updated_at,
        });
        Ok(())
    }

    /// Updates the timestamp.
    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
