//! # Storefront
//!
//! Wires the services into one handle. Services share the catalog and the
//! notification store; everything sits behind `Arc` so request handlers
//! can clone what they need.

use std::sync::Arc;

use tracing::info;

use crate::{
    errors::CommerceError,
    implementation::{
        addresses::{AddressBook, AddressId},
        cart_system::CartService,
        discounts::DiscountService,
        notifications::{LogMailer, Mailer, NotificationService},
        order_management::{
            Checkout, CheckoutRequest, Order, OrderService, PaymentGateway, PaymentMethod,
        },
        product_catalog::ProductCatalog,
        shipping::{ShippingService, ShippingSettings},
        uploads::{BlobStore, ImageUploader, InMemoryBlobStore},
    },
    types::{context::RequestContext, StoreConfig},
};

/// External services plugged into a [`Storefront`].
pub struct StorefrontServices {
    /// Transactional e-mail.
    pub mailer:   Arc<dyn Mailer>,
    /// Image storage.
    pub blobs:    Arc<dyn BlobStore>,
    /// Card payment provider.
    pub gateway:  Option<Arc<dyn PaymentGateway>>,
    /// Initial shipping settings.
    pub shipping: ShippingSettings,
}

impl Default for StorefrontServices {
    fn default() -> Self {
        Self {
            mailer:   Arc::new(LogMailer),
            blobs:    Arc::new(InMemoryBlobStore::new()),
            gateway:  None,
            shipping: ShippingSettings::default(),
        }
    }
}

/// Storefront and back-office services.
pub struct Storefront {
    config:        StoreConfig,
    catalog:       Arc<ProductCatalog>,
    carts:         Arc<CartService>,
    discounts:     Arc<DiscountService>,
    shipping:      Arc<ShippingService>,
    addresses:     Arc<AddressBook>,
    orders:        Arc<OrderService>,
    notifications: Arc<NotificationService>,
    uploader:      ImageUploader,
    checkout:      Checkout,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("store_name", &self.config.store_name)
            .field("checkout", &self.checkout)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Creates a storefront that logs e-mail and keeps images in memory.
    pub fn new(config: StoreConfig) -> Result<Self, CommerceError> {
        Self::with_services(config, StorefrontServices::default())
    }

    /// Creates a storefront with the given external services.
    pub fn with_services(
        config: StoreConfig, services: StorefrontServices,
    ) -> Result<Self, CommerceError> {
        config.validate()?;
        services.shipping.validate()?;

        let catalog =
            Arc::new(ProductCatalog::new().with_blob_store(Arc::clone(&services.blobs)));
        let carts = Arc::new(CartService::new(Arc::clone(&catalog)));
        let discounts = Arc::new(DiscountService::new());
        let shipping = Arc::new(ShippingService::new(services.shipping));
        let notifications = Arc::new(NotificationService::new());
        let orders = Arc::new(OrderService::new(
            config.clone(),
            Arc::clone(&notifications),
            services.mailer,
        ));
        let uploader = ImageUploader::new(services.blobs, &config);

        let mut checkout = Checkout::new(
            config.clone(),
            Arc::clone(&catalog),
            Arc::clone(&carts),
            Arc::clone(&discounts),
            Arc::clone(&shipping),
            Arc::clone(&orders),
        );
        if let Some(gateway) = services.gateway {
            checkout = checkout.with_payment_gateway(gateway);
        }

        info!(store = %config.store_name, currency = %config.currency, "storefront ready");
        Ok(Self {
            config,
            catalog,
            carts,
            discounts,
            shipping,
            addresses: Arc::new(AddressBook::new()),
            orders,
            notifications,
            uploader,
            checkout,
        })
    }

    /// Store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Installs the tracing subscriber using the configured log filter.
    pub fn init_logging(&self) -> Result<bool, CommerceError> {
        crate::telemetry::init_tracing(&self.config.log_filter)
    }

    /// Product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<ProductCatalog> {
        &self.catalog
    }

    /// Carts.
    #[must_use]
    pub fn carts(&self) -> &Arc<CartService> {
        &self.carts
    }

    /// Discount codes.
    #[must_use]
    pub fn discounts(&self) -> &Arc<DiscountService> {
        &self.discounts
    }

    /// Shipping settings.
    #[must_use]
    pub fn shipping(&self) -> &Arc<ShippingService> {
        &self.shipping
    }

    /// Saved addresses.
    #[must_use]
    pub fn addresses(&self) -> &Arc<AddressBook> {
        &self.addresses
    }

    /// Orders.
    #[must_use]
    pub fn orders(&self) -> &Arc<OrderService> {
        &self.orders
    }

    /// In-app notifications.
    #[must_use]
    pub fn notifications(&self) -> &Arc<NotificationService> {
        &self.notifications
    }

    /// Image uploads.
    #[must_use]
    pub fn uploader(&self) -> &ImageUploader {
        &self.uploader
    }

    /// Places an order; see [`Checkout::place_order`].
    pub fn place_order(
        &self, ctx: &RequestContext, request: CheckoutRequest,
    ) -> Result<Order, CommerceError> {
        self.checkout.place_order(ctx, request)
    }

    /// Builds a checkout request from one of the caller's saved addresses,
    /// or their default address when `address_id` is `None`.
    pub fn checkout_request(
        &self, ctx: &RequestContext, address_id: Option<&AddressId>,
        payment_method: PaymentMethod,
    ) -> Result<CheckoutRequest, CommerceError> {
        let address = match address_id {
            Some(id) => self.addresses.get_address(ctx, id)?,
            None => self
                .addresses
                .default_address(ctx)?
                .ok_or_else(|| CommerceError::AddressNotFound("default".to_string()))?,
        };
        Ok(CheckoutRequest::new(address.snapshot(), payment_method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::run_action;
    use crate::implementation::{
        addresses::ShippingAddress,
        discounts::Discount,
        notifications::RecordingMailer,
        order_management::OrderStatus,
        shipping::ShippingRule,
    };
    use crate::types::{
        context::UserId,
        product_catalog::{Product, ProductId, ProductStatus},
    };

    fn admin() -> RequestContext {
        RequestContext::admin(UserId::new("admin"), "admin@shop.test", "Admin")
    }

    fn customer() -> RequestContext {
        RequestContext::customer(UserId::new("u1"), "u1@shop.test", "Nadia")
    }

    fn storefront(mailer: Arc<RecordingMailer>) -> Storefront {
        let shipping = ShippingSettings {
            free_shipping_threshold: Some(2000),
            flat_rate: 150,
            rules: vec![ShippingRule::new(1001, Some(2000), 100)],
            ..ShippingSettings::default()
        };
        let services = StorefrontServices {
            mailer: mailer as Arc<dyn Mailer>,
            shipping,
            ..StorefrontServices::default()
        };
        Storefront::with_services(StoreConfig::default(), services).expect("storefront")
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = StoreConfig { order_number_prefix: String::new(), ..StoreConfig::default() };
        assert!(matches!(Storefront::new(config), Err(CommerceError::ConfigError(_))));
    }

    #[test]
    fn test_end_to_end_checkout_from_saved_address() {
        let mailer = Arc::new(RecordingMailer::new());
        let store = storefront(Arc::clone(&mailer));
        let ctx = customer();

        let mut serum = Product::new(ProductId::new("serum"), "Vitamin C Serum", 900);
        serum.status = ProductStatus::Active;
        serum.stock = 5;
        store.catalog().add_product(&admin(), serum).expect("add product");
        let starts_at = chrono::Utc::now() - chrono::Duration::hours(1);
        store
            .discounts()
            .create_discount(&admin(), Discount::percentage("GLOW10", 10, starts_at))
            .expect("discount");

        let details =
            ShippingAddress::new("Nadia", "01700000000", "12 Lake Road", "Dhaka", "1207", "BD");
        store.addresses().add_address(&ctx, details, false).expect("address");
        store.carts().add_item(&ctx, &ProductId::new("serum"), 2).expect("cart");

        let request = store
            .checkout_request(&ctx, None, PaymentMethod::CashOnDelivery)
            .expect("request")
            .with_discount_code("GLOW10");
        let order = store.place_order(&ctx, request).expect("order");

        assert_eq!(order.total, 1720);
        assert_eq!(order.shipping_address.city, "Dhaka");
        assert_eq!(mailer.sent().expect("sent").len(), 1);
        assert_eq!(store.notifications().unread_count(&ctx).expect("unread"), 1);

        let shipped = run_action("update order", || {
            store.orders().update_status(&admin(), &order.id, OrderStatus::Shipped)
        });
        assert!(!shipped.success);
        assert_eq!(shipped.code, Some("invalid_transition"));
    }

    #[test]
    fn test_checkout_request_without_default_address() {
        let store = storefront(Arc::new(RecordingMailer::new()));
        let result = store.checkout_request(&customer(), None, PaymentMethod::CashOnDelivery);
        assert!(matches!(result, Err(CommerceError::AddressNotFound(_))));
    }
}
