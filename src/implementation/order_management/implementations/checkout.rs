//! Checkout.
//!
//! Turns a cart (or a guest's line list) into a persisted order. Every
//! check runs before anything is written; the only writes that can still
//! fail after stock is taken are undone by putting the stock back.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::super::types::{
    basic_types::{PaymentMethod, PaymentStatus},
    main_order_types::{Order, OrderDraft, OrderTotals},
    order_types::OrderLineItem,
    payment_types::{PaymentGateway, PaymentOutcome, PaymentRequest},
    service_types::OrderService,
};
use crate::{
    errors::CommerceError,
    implementation::{
        addresses::ShippingAddress,
        cart_system::CartService,
        discounts::DiscountService,
        product_catalog::{ProductCatalog, StockLine},
        shipping::ShippingService,
    },
    types::{context::RequestContext, product_catalog::ProductId, StoreConfig},
};

/// Line supplied directly by a guest shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestLine {
    /// Product to buy.
    pub product_id: ProductId,
    /// Units.
    pub quantity:   u32,
}

/// Checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Where to ship.
    pub shipping_address: ShippingAddress,
    /// How the customer pays.
    pub payment_method:   PaymentMethod,
    /// Optional discount code.
    pub discount_code:    Option<String>,
    /// Note for the store.
    pub notes:            Option<String>,
    /// Contact e-mail; required for guests, overrides the account e-mail otherwise.
    pub contact_email:    Option<String>,
    /// Lines for guest checkout; ignored for signed-in users.
    pub guest_items:      Vec<GuestLine>,
}

impl CheckoutRequest {
    /// Creates a request with no discount, note or guest lines.
    #[must_use]
    pub fn new(shipping_address: ShippingAddress, payment_method: PaymentMethod) -> Self {
        Self {
            shipping_address,
            payment_method,
            discount_code: None,
            notes: None,
            contact_email: None,
            guest_items: Vec::new(),
        }
    }

    /// Sets the discount code.
    #[must_use]
    pub fn with_discount_code(mut self, code: impl Into<String>) -> Self {
        self.discount_code = Some(code.into());
        self
    }

    /// Sets the note.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets the contact e-mail.
    #[must_use]
    pub fn with_contact_email(mut self, email: impl Into<String>) -> Self {
        self.contact_email = Some(email.into());
        self
    }

    /// Adds a guest line.
    #[must_use]
    pub fn with_guest_item(mut self, product_id: ProductId, quantity: u32) -> Self {
        self.guest_items.push(GuestLine { product_id, quantity });
        self
    }
}

/// Places orders.
pub struct Checkout {
    config:    StoreConfig,
    catalog:   Arc<ProductCatalog>,
    carts:     Arc<CartService>,
    discounts: Arc<DiscountService>,
    shipping:  Arc<ShippingService>,
    orders:    Arc<OrderService>,
    gateway:   Option<Arc<dyn PaymentGateway>>,
}

impl std::fmt::Debug for Checkout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkout")
            .field("gateway", &self.gateway.as_ref().map(|g| g.name().to_string()))
            .finish_non_exhaustive()
    }
}

impl Checkout {
    /// Creates a checkout without a payment gateway.
    #[must_use]
    pub fn new(
        config: StoreConfig, catalog: Arc<ProductCatalog>, carts: Arc<CartService>,
        discounts: Arc<DiscountService>, shipping: Arc<ShippingService>,
        orders: Arc<OrderService>,
    ) -> Self {
        Self { config, catalog, carts, discounts, shipping, orders, gateway: None }
    }

    /// Attaches the card payment gateway.
    #[must_use]
    pub fn with_payment_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Places an order for the caller's cart, or for the guest lines.
    ///
    /// # Errors
    /// `CartEmpty` with no lines; catalog, discount and shipping errors as
    /// raised; `PaymentGatewayNotConfigured` for card payments without a
    /// gateway. Confirmation e-mail failures are logged only.
    pub fn place_order(
        &self, ctx: &RequestContext, request: CheckoutRequest,
    ) -> Result<Order, CommerceError> {
        let now = Utc::now();
        request.shipping_address.validate()?;

        let customer_email = Self::customer_email(ctx, &request)?;
        let lines = self.resolve_lines(ctx, &request)?;
        if lines.is_empty() {
            return Err(CommerceError::CartEmpty);
        }

        let items = self.snapshot_lines(&lines)?;
        let subtotal = items.iter().fold(0u64, |acc, i| acc.saturating_add(i.line_total));

        let code = request.discount_code.as_deref().map(str::trim).filter(|c| !c.is_empty());
        if let Some(code) = code {
            self.discounts.apply_code(code, subtotal, now)?;
        }

        let settings = self.shipping.settings()?;
        let destination = settings.destination_for(&request.shipping_address.country);
        let shipping = settings.quote(subtotal, &destination)?;

        let gateway = match request.payment_method {
            PaymentMethod::Card => Some(self.card_gateway()?),
            PaymentMethod::CashOnDelivery => None,
        };

        let order_number = self.orders.next_order_number(now)?;

        // Evaluated and counted under one lock; given back if the order is not placed.
        let (discount_code, discount) = match code {
            Some(code) => {
                let (code, reduction) = self.discounts.redeem(code, subtotal, now)?;
                (Some(code), reduction)
            },
            None => (None, 0),
        };
        let totals = OrderTotals::compute(subtotal, discount, shipping);

        if let Err(e) = self.catalog.reserve_stock(&lines) {
            self.release_discount(discount_code.as_deref());
            return Err(e);
        }

        let (payment_status, payment_reference) = match gateway {
            None => (PaymentStatus::Pending, None),
            Some(gateway) => {
                let charge = PaymentRequest {
                    order_number:   order_number.clone(),
                    amount:         totals.total,
                    currency:       self.config.currency.clone(),
                    customer_email: customer_email.clone(),
                };
                match gateway.authorize(&charge) {
                    Ok(PaymentOutcome::Approved { reference }) => {
                        (PaymentStatus::Paid, Some(reference))
                    },
                    Ok(PaymentOutcome::Declined { reason }) => {
                        warn!(
                            order = %order_number,
                            gateway = gateway.name(),
                            %reason,
                            "card declined"
                        );
                        (PaymentStatus::Failed, None)
                    },
                    Err(e) => {
                        self.restore_stock(&lines);
                        self.release_discount(discount_code.as_deref());
                        return Err(e);
                    },
                }
            },
        };

        let order_code = discount_code.clone();
        let draft = OrderDraft {
            user_id: ctx.user_id().cloned(),
            customer_email,
            items,
            shipping_address: request.shipping_address,
            totals,
            discount_code,
            payment_method: request.payment_method,
            payment_status,
            payment_reference,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
        };

        let order = match self.orders.insert_order(Order::from_draft(draft, order_number, now)) {
            Ok(order) => order,
            Err(e) => {
                self.restore_stock(&lines);
                self.release_discount(order_code.as_deref());
                return Err(e);
            },
        };

        if let Some(user_id) = &order.user_id {
            if let Err(e) = self.carts.clear_for(user_id) {
                warn!(order = %order.order_number, error = %e, "cart not cleared");
            }
        }

        info!(
            order = %order.order_number,
            items = order.item_count(),
            total = order.total,
            payment = order.payment_method.display_name(),
            "order placed"
        );
        self.orders.announce_placed(&order);
        Ok(order)
    }

    fn customer_email(
        ctx: &RequestContext, request: &CheckoutRequest,
    ) -> Result<String, CommerceError> {
        let given = request.contact_email.as_deref().map(str::trim).filter(|e| !e.is_empty());
        let email = match (given, &ctx.user) {
            (Some(email), _) => email.to_string(),
            (None, Some(user)) => user.email.clone(),
            (None, None) => {
                return Err(CommerceError::ValidationError(
                    "contact email is required for guest checkout".to_string(),
                ))
            },
        };
        if !email.contains('@') {
            return Err(CommerceError::ValidationError(format!("invalid email: {email}")));
        }
        Ok(email)
    }

    fn resolve_lines(
        &self, ctx: &RequestContext, request: &CheckoutRequest,
    ) -> Result<Vec<StockLine>, CommerceError> {
        if ctx.user.is_some() {
            let cart = self.carts.get_or_create_cart(ctx)?;
            return Ok(cart
                .items
                .iter()
                .map(|i| StockLine { product_id: i.product_id.clone(), quantity: i.quantity })
                .collect());
        }

        request
            .guest_items
            .iter()
            .map(|line| {
                if line.quantity == 0 {
                    return Err(CommerceError::InvalidQuantity);
                }
                Ok(StockLine { product_id: line.product_id.clone(), quantity: line.quantity })
            })
            .collect()
    }

    fn snapshot_lines(&self, lines: &[StockLine]) -> Result<Vec<OrderLineItem>, CommerceError> {
        lines
            .iter()
            .map(|line| {
                let product = self.catalog.get_product(&line.product_id)?;
                if !product.status.is_purchasable() {
                    return Err(CommerceError::ProductNotAvailable(product.id.to_string()));
                }
                Ok(OrderLineItem::snapshot(&product, line.quantity))
            })
            .collect()
    }

    fn card_gateway(&self) -> Result<Arc<dyn PaymentGateway>, CommerceError> {
        match &self.gateway {
            Some(gateway) if self.config.card_payments_enabled => Ok(Arc::clone(gateway)),
            _ => Err(CommerceError::PaymentGatewayNotConfigured(
                PaymentMethod::Card.display_name().to_string(),
            )),
        }
    }

    fn restore_stock(&self, lines: &[StockLine]) {
        if let Err(e) = self.catalog.release_stock(lines) {
            error!(error = %e, "stock not restored after failed checkout");
        }
    }

    fn release_discount(&self, code: Option<&str>) {
        if let Some(code) = code {
            if let Err(e) = self.discounts.release_usage(code) {
                error!(%code, error = %e, "discount use not released after failed checkout");
            }
        }
    }
}
