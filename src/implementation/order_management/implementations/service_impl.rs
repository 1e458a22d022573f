//! Service implementation.
//!
//! Order storage, numbering, queries and admin status changes. Status
//! changes send an e-mail and an in-app notification; delivery failures
//! are logged and never undo the change.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::super::types::{
    basic_types::{OrderId, OrderStatus, PaymentStatus},
    main_order_types::Order,
    service_types::{OrderFilter, OrderService},
};
use crate::{
    errors::CommerceError,
    implementation::notifications::{
        templates, Mailer, Notification, NotificationKind, NotificationService, OutboundEmail,
    },
    types::{context::RequestContext, StoreConfig},
};

impl OrderService {
    /// Creates a new order service.
    #[must_use]
    pub fn new(
        config: StoreConfig, notifications: Arc<NotificationService>, mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            orders: Arc::new(Mutex::new(HashMap::new())),
            order_counter: Arc::new(Mutex::new(0)),
            config,
            notifications,
            mailer,
        }
    }

    /// Issues the next order number: `{prefix}-{YYYYMMDD}-{sequence}`.
    ///
    /// The sequence never repeats within the store, so numbers are unique.
    pub(crate) fn next_order_number(&self, now: DateTime<Utc>) -> Result<String, CommerceError> {
        let mut counter = self.order_counter.lock().map_err(|_| CommerceError::LockError)?;
        *counter += 1;
        Ok(format!(
            "{}-{}-{:05}",
            self.config.order_number_prefix,
            now.format("%Y%m%d"),
            *counter
        ))
    }

    /// Stores a new order.
    pub(crate) fn insert_order(&self, order: Order) -> Result<Order, CommerceError> {
        let mut orders = self.orders.lock().map_err(|_| CommerceError::LockError)?;
        if orders.values().any(|o| o.order_number == order.order_number) {
            return Err(CommerceError::InternalError(format!(
                "duplicate order number {}",
                order.order_number
            )));
        }
        orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    /// Gets an order visible to the caller: their own, or any for admins.
    pub fn get_order(&self, ctx: &RequestContext, id: &OrderId) -> Result<Order, CommerceError> {
        ctx.require_user()?;
        let orders = self.orders.lock().map_err(|_| CommerceError::LockError)?;
        orders
            .get(id)
            .filter(|o| Self::visible_to(ctx, o))
            .cloned()
            .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()))
    }

    /// Gets an order by its display number.
    pub fn get_order_by_number(
        &self, ctx: &RequestContext, order_number: &str,
    ) -> Result<Order, CommerceError> {
        ctx.require_user()?;
        let orders = self.orders.lock().map_err(|_| CommerceError::LockError)?;
        orders
            .values()
            .find(|o| o.order_number == order_number && Self::visible_to(ctx, o))
            .cloned()
            .ok_or_else(|| CommerceError::OrderNotFound(order_number.to_string()))
    }

    /// The caller's orders, newest first.
    pub fn user_orders(&self, ctx: &RequestContext) -> Result<Vec<Order>, CommerceError> {
        let user = ctx.require_user()?;
        let orders = self.orders.lock().map_err(|_| CommerceError::LockError)?;

        let mut mine: Vec<Order> =
            orders.values().filter(|o| o.is_owned_by(&user.id)).cloned().collect();

        // Sort by creation date descending
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }

    /// Searches all orders, newest first.
    pub fn search_orders(
        &self, ctx: &RequestContext, filter: &OrderFilter,
    ) -> Result<Vec<Order>, CommerceError> {
        ctx.require_admin()?;
        let orders = self.orders.lock().map_err(|_| CommerceError::LockError)?;

        let mut filtered: Vec<Order> =
            orders.values().filter(|o| Self::matches_filter(o, filter)).cloned().collect();
        filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(filtered)
    }

    /// Sets the order status.
    pub fn update_status(
        &self, ctx: &RequestContext, id: &OrderId, status: OrderStatus,
    ) -> Result<Order, CommerceError> {
        let admin = ctx.require_admin()?;
        let updated = {
            let mut orders = self.orders.lock().map_err(|_| CommerceError::LockError)?;
            let order =
                orders.get_mut(id).ok_or_else(|| CommerceError::OrderNotFound(id.to_string()))?;
            order.transition_status(status, Some(admin.id.to_string()))?;
            order.clone()
        };

        info!(
            order = %updated.order_number,
            status = updated.status.display_name(),
            "order status changed"
        );
        self.announce_status(&updated);
        Ok(updated)
    }

    /// Sets the payment status.
    pub fn update_payment_status(
        &self, ctx: &RequestContext, id: &OrderId, status: PaymentStatus,
    ) -> Result<Order, CommerceError> {
        let admin = ctx.require_admin()?;
        let updated = {
            let mut orders = self.orders.lock().map_err(|_| CommerceError::LockError)?;
            let order =
                orders.get_mut(id).ok_or_else(|| CommerceError::OrderNotFound(id.to_string()))?;
            order.transition_payment(status, Some(admin.id.to_string()))?;
            order.clone()
        };

        info!(
            order = %updated.order_number,
            payment = updated.payment_status.display_name(),
            "payment status changed"
        );
        self.announce_status(&updated);
        Ok(updated)
    }

    /// Cancels one of the caller's own pending orders.
    pub fn cancel_order(
        &self, ctx: &RequestContext, id: &OrderId, reason: Option<&str>,
    ) -> Result<Order, CommerceError> {
        let user = ctx.require_user()?;
        let cancelled = {
            let mut orders = self.orders.lock().map_err(|_| CommerceError::LockError)?;
            let order = orders
                .get_mut(id)
                .filter(|o| o.is_owned_by(&user.id))
                .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()))?;
            order.cancel(reason, Some(user.id.to_string()))?;
            order.clone()
        };

        info!(order = %cancelled.order_number, "order cancelled by customer");
        self.announce_status(&cancelled);
        Ok(cancelled)
    }

    /// Sends the confirmation e-mail and notification for a new order.
    pub(crate) fn announce_placed(&self, order: &Order) {
        self.deliver(
            order,
            &templates::order_confirmation(order, &self.config),
            "Order placed",
            format!("We received your order {}.", order.order_number),
        );
    }

    fn announce_status(&self, order: &Order) {
        self.deliver(
            order,
            &templates::status_update(order, &self.config),
            "Order updated",
            format!("Order {} is now {}.", order.order_number, order.status.display_name()),
        );
    }

    fn deliver(&self, order: &Order, email: &OutboundEmail, title: &str, message: String) {
        if let Err(e) = self.mailer.send(email) {
            warn!(order = %order.order_number, error = %e, "order email not sent");
        }

        if let Some(user_id) = &order.user_id {
            let notification =
                Notification::new(user_id.clone(), NotificationKind::Order, title, message)
                    .with_link(format!("/orders/{}", order.order_number));
            if let Err(e) = self.notifications.notify(notification) {
                warn!(order = %order.order_number, error = %e, "order notification not stored");
            }
        }
    }

    fn visible_to(ctx: &RequestContext, order: &Order) -> bool {
        ctx.is_admin() || ctx.user_id().is_some_and(|id| order.is_owned_by(id))
    }

    /// Matches order against filter.
    fn matches_filter(order: &Order, filter: &OrderFilter) -> bool {
        if filter.status.is_some_and(|s| order.status != s) {
            return false;
        }
        if filter.payment_status.is_some_and(|s| order.payment_status != s) {
            return false;
        }
        if filter.payment_method.is_some_and(|m| order.payment_method != m) {
            return false;
        }
        if let Some(user_id) = &filter.user_id {
            if !order.is_owned_by(user_id) {
                return false;
            }
        }
        if filter.min_total.is_some_and(|min| order.total < min) {
            return false;
        }
        if filter.max_total.is_some_and(|max| order.total > max) {
            return false;
        }
        if filter.created_from.is_some_and(|from| order.created_at < from) {
            return false;
        }
        if filter.created_to.is_some_and(|to| order.created_at > to) {
            return false;
        }
        if let Some(query) = &filter.query {
            let query = query.trim().to_lowercase();
            if !query.is_empty()
                && !order.order_number.to_lowercase().contains(&query)
                && !order.customer_email.to_lowercase().contains(&query)
            {
                return false;
            }
        }
        true
    }
}
