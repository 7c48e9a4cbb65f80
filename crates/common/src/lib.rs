//! Shared types for the inventory system.
//!
//! - Typed identifiers for products, categories and suppliers
//! - [`RequestContext`], the explicit caller identity threaded through every request

pub mod context;
pub mod types;

pub use context::{Actor, RequestContext};
pub use types::{CategoryId, CorrelationId, ProductId, SupplierId};
