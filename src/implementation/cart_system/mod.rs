//! # Cart System
//!
//! One cart per signed-in user. Lines hold only product references and
//! quantities; prices come from the catalog each time the cart is read.

mod cart;
mod item;
mod service;
mod types;

pub use cart::Cart;
pub use item::CartItem;
pub use service::CartService;
pub use types::{CartId, CartSummary, PricedLine};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::errors::CommerceError;
    use crate::implementation::product_catalog::ProductCatalog;
    use crate::types::context::{RequestContext, UserId};
    use crate::types::product_catalog::{Product, ProductId, ProductStatus};

    fn create_test_product(id: &str, price: u64) -> Product {
        let mut product = Product::new(ProductId::new(id), format!("Product {id}"), price);
        product.status = ProductStatus::Active;
        product.stock = 100;
        product
    }

    fn admin() -> RequestContext {
        RequestContext::admin(UserId::new("admin"), "admin@shop.test", "Admin")
    }

    fn customer(id: &str) -> RequestContext {
        RequestContext::customer(UserId::new(id), format!("{id}@shop.test"), id)
    }

    fn service_with(products: Vec<Product>) -> CartService {
        let catalog = ProductCatalog::new();
        for product in products {
            catalog.add_product(&admin(), product).expect("seed product");
        }
        CartService::new(Arc::new(catalog))
    }

    #[test]
    fn test_cart_creation() {
        let cart = Cart::new(UserId::new("customer-1"));

        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let mut cart = Cart::new(UserId::new("customer-1"));
        let mut products = Vec::new();
        for id in ["big-1", "big-2"] {
            let mut product = create_test_product(id, u64::MAX);
            product.stock = u32::MAX;
            cart.add_item(&product, u32::MAX).expect("add");
            products.push(product);
        }

        assert_eq!(cart.total_quantity(), u32::MAX);
        let summary = cart.summarize(|id| products.iter().find(|p| &p.id == id).cloned());
        assert_eq!(summary.subtotal, u64::MAX);
        assert_eq!(summary.item_count, u32::MAX);
    }

    #[test]
    fn test_add_item() {
        let mut cart = Cart::new(UserId::new("customer-1"));
        let product = create_test_product("001", 1000);

        cart.add_item(&product, 2).expect("should add item");

        assert!(!cart.is_empty());
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.unique_item_count(), 1);
    }

    #[test]
    fn test_add_same_item_increases_quantity() {
        let mut cart = Cart::new(UserId::new("customer-1"));
        let product = create_test_product("001", 1000);

        cart.add_item(&product, 2).expect("add first");
        cart.add_item(&product, 3).expect("add second");

        assert_eq!(cart.unique_item_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_add_zero_quantity_rejected() {
        let mut cart = Cart::new(UserId::new("customer-1"));
        let product = create_test_product("001", 1000);

        assert_eq!(cart.add_item(&product, 0), Err(CommerceError::InvalidQuantity));
    }

    #[test]
    fn test_add_draft_product_rejected() {
        let mut cart = Cart::new(UserId::new("customer-1"));
        let mut product = create_test_product("001", 1000);
        product.status = ProductStatus::Draft;

        assert!(matches!(cart.add_item(&product, 1), Err(CommerceError::ProductNotAvailable(_))));
    }

    #[test]
    fn test_add_beyond_stock_rejected() {
        let mut cart = Cart::new(UserId::new("customer-1"));
        let mut product = create_test_product("001", 1000);
        product.stock = 3;

        cart.add_item(&product, 2).expect("add");
        let result = cart.add_item(&product, 2);
        assert!(matches!(
            result,
            Err(CommerceError::InsufficientInventory { available: 3, requested: 4, .. })
        ));
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new(UserId::new("customer-1"));
        let product = create_test_product("001", 1000);

        cart.add_item(&product, 2).expect("add");
        cart.remove_item(&product.id).expect("remove");

        assert!(cart.is_empty());
        assert!(matches!(cart.remove_item(&product.id), Err(CommerceError::ItemNotInCart(_))));
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Cart::new(UserId::new("customer-1"));
        let product = create_test_product("001", 1000);

        cart.add_item(&product, 2).expect("add");
        cart.update_item_quantity(&product, 5).expect("update");
        assert_eq!(cart.total_quantity(), 5);

        cart.update_item_quantity(&product, -1).expect("remove via update");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_summary_prices_from_live_catalog() {
        let mut discounted = create_test_product("002", 2000);
        discounted.discounted_price = Some(1500);
        let service = service_with(vec![create_test_product("001", 1000), discounted]);
        let ctx = customer("u1");

        service.add_item(&ctx, &ProductId::new("001"), 2).expect("add 1");
        service.add_item(&ctx, &ProductId::new("002"), 1).expect("add 2");

        let summary = service.cart_summary(&ctx).expect("summary");
        assert_eq!(summary.subtotal, 3500);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.lines.len(), 2);
        assert!(summary.all_available());
    }

    #[test]
    fn test_service_keeps_one_cart_per_user() {
        let service = service_with(vec![create_test_product("001", 1000)]);
        let pid = ProductId::new("001");

        service.add_item(&customer("u1"), &pid, 1).expect("u1 add");
        service.add_item(&customer("u1"), &pid, 1).expect("u1 add again");
        service.add_item(&customer("u2"), &pid, 4).expect("u2 add");

        let first = service.get_or_create_cart(&customer("u1")).expect("u1 cart");
        let second = service.get_or_create_cart(&customer("u2")).expect("u2 cart");
        assert_eq!(first.items.len(), 1);
        assert_eq!(first.total_quantity(), 2);
        assert_eq!(second.total_quantity(), 4);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_service_update_to_zero_removes_line() {
        let service = service_with(vec![create_test_product("001", 1000)]);
        let ctx = customer("u1");
        let pid = ProductId::new("001");

        service.add_item(&ctx, &pid, 3).expect("add");
        let cart = service.update_quantity(&ctx, &pid, 0).expect("update");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_service_unknown_product() {
        let service = service_with(Vec::new());
        let result = service.add_item(&customer("u1"), &ProductId::new("nope"), 1);
        assert!(matches!(result, Err(CommerceError::ProductNotFound(_))));
    }

    #[test]
    fn test_guest_has_no_cart() {
        let service = service_with(Vec::new());
        let result = service.get_or_create_cart(&RequestContext::guest());
        assert_eq!(result, Err(CommerceError::NotAuthenticated));
    }

    #[test]
    fn test_clear_cart() {
        let service = service_with(vec![create_test_product("001", 1000)]);
        let ctx = customer("u1");

        service.add_item(&ctx, &ProductId::new("001"), 1).expect("add");
        service.clear_cart(&ctx).expect("clear");

        let summary = service.cart_summary(&ctx).expect("summary");
        assert_eq!(summary.subtotal, 0);
        assert!(summary.lines.is_empty());
    }
}
