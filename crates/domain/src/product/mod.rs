//! Product entity and its lifecycle status.

mod entity;
mod status;

pub use entity::{MAX_DESCRIPTION_LEN, Product, ProductRecord};
pub use status::ProductStatus;
