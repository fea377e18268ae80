//! Product catalog module.
//!
//! Contains the denormalized product records returned by search.

mod price;
mod product;

pub use price::PriceInfo;
pub use product::{BrandRef, LocalizedText, ProductSummary};
