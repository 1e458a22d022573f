//! Type definitions for order management.

pub mod basic_types;
pub mod main_order_types;
pub mod order_types;
pub mod payment_types;
pub mod service_types;

pub use basic_types::*;
pub use main_order_types::*;
pub use order_types::*;
pub use payment_types::*;
pub use service_types::*;
