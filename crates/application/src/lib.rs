//! Inventory use cases.
//!
//! Commands and queries are [`mediator::Request`]s with one handler each.
//! Domain events raised while a command runs are published when its unit of
//! work is saved, and reach the handlers in [`events`]. [`build_mediator`]
//! is the single place where all of them are registered.

pub mod categories;
pub mod error;
pub mod events;
pub mod products;
pub mod setup;
pub mod suppliers;

pub use categories::{
    CategoryResponse, CreateCategory, DeleteCategory, GetCategories, GetCategoryById,
};
pub use error::{ApplicationError, Result};
pub use products::{
    CreateProduct, GetProductById, GetProducts, MoneyResponse, ProductResponse,
    UpdateProductStatus,
};
pub use setup::{Services, build_mediator};
pub use suppliers::{
    CreateSupplier, DeleteSupplier, GetSupplierById, GetSuppliers, SupplierResponse,
};
