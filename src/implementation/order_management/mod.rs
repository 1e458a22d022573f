//! # Order Management
//!
//! Checkout, order storage and the order/payment status lifecycle.
//!
//! - `types/`: order records, status enums, the payment gateway seam
//! - `implementations/`: order behavior, the order service and checkout

pub mod implementations;
pub mod types;


pub use implementations::*;
pub use types::*;
