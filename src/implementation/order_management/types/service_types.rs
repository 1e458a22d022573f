//! Service types for order management.
//!
//! `OrderService` state and the admin search filter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::basic_types::{OrderId, OrderStatus, PaymentMethod, PaymentStatus};
use super::main_order_types::Order;
use crate::{
    implementation::notifications::{Mailer, NotificationService},
    types::{context::UserId, StoreConfig},
};

/// Order management service.
pub struct OrderService {
    /// Orders indexed by ID.
    pub(crate) orders:        Arc<Mutex<HashMap<OrderId, Order>>>,
    /// Last issued order sequence number.
    pub(crate) order_counter: Arc<Mutex<u64>>,
    /// Store settings used for numbering and e-mail.
    pub(crate) config:        StoreConfig,
    /// In-app notifications.
    pub(crate) notifications: Arc<NotificationService>,
    /// Transactional e-mail.
    pub(crate) mailer:        Arc<dyn Mailer>,
}

impl std::fmt::Debug for OrderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService")
            .field("order_number_prefix", &self.config.order_number_prefix)
            .finish_non_exhaustive()
    }
}

/// Order search filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderFilter {
    /// Filter by status.
    pub status:         Option<OrderStatus>,
    /// Filter by payment status.
    pub payment_status: Option<PaymentStatus>,
    /// Filter by payment method.
    pub payment_method: Option<PaymentMethod>,
    /// Filter by customer.
    pub user_id:        Option<UserId>,
    /// Minimum total.
    pub min_total:      Option<u64>,
    /// Maximum total.
    pub max_total:      Option<u64>,
    /// Created at or after.
    pub created_from:   Option<DateTime<Utc>>,
    /// Created at or before.
    pub created_to:     Option<DateTime<Utc>>,
    /// Case-insensitive match on order number or customer e-mail.
    pub query:          Option<String>,
}

impl OrderFilter {
    /// Filter on one status.
    #[must_use]
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filter on a free-text query.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}
