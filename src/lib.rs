//! # Storefront Commerce
//!
//! Storefront and back-office core of a small online shop: catalog, carts,
//! discount codes, shipping rules, checkout, the order lifecycle, saved
//! addresses, notifications and image uploads.

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::unnecessary_sort_by)]
#![allow(clippy::missing_panics_doc)]

pub mod errors;
pub mod implementation;
pub mod storefront;
pub mod telemetry;
pub mod types;

// Re-exports for public API
pub use errors::{run_action, ActionResponse, CommerceError, CommerceResult};
pub use storefront::{Storefront, StorefrontServices};
pub use types::{
    context::{RequestContext, Role, SessionUser, UserId},
    StoreConfig,
};
