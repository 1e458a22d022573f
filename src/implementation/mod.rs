//! Implementation details for the storefront

pub mod addresses;
pub mod cart_system;
pub mod discounts;
pub mod notifications;
pub mod order_management;
pub mod product_catalog;
pub mod shipping;
pub mod uploads;
