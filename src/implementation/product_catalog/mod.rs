//! # Product Catalog
//!
//! Catalog store for products, categories and collections.

mod service;
mod tests;

pub use service::{ProductCatalog, StockLine};
