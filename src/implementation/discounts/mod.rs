//! # Discounts
//!
//! Discount codes and the pure evaluator that turns a code into a reduction.

mod evaluator;
mod service;
mod types;

pub use evaluator::evaluate_discount;
pub use service::DiscountService;
pub use types::{Discount, DiscountId, DiscountType, InactiveReason};
