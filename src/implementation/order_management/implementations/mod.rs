//! Order management implementations.

pub mod checkout;
pub mod order_impl;
pub mod service_impl;

pub use checkout::{Checkout, CheckoutRequest, GuestLine};
