//! Domain layer for the inventory system.
//!
//! This crate provides:
//! - The [`Entity`] trait and per-entity [`EventQueue`] of pending events
//! - The [`DomainEvent`] variants raised by entities
//! - [`Product`], [`Category`] and [`Supplier`] with their value objects

pub mod category;
pub mod entity;
pub mod error;
pub mod events;
pub mod product;
pub mod queue;
pub mod supplier;
pub mod value_objects;

pub use category::Category;
pub use entity::Entity;
pub use error::DomainError;
pub use events::{
    CategoryLink, DomainEvent, EventMetadata, ProductCreated, ProductSnapshot, ProductSold,
    SupplierLink,
};
pub use product::{MAX_DESCRIPTION_LEN, Product, ProductRecord, ProductStatus};
pub use queue::EventQueue;
pub use supplier::Supplier;
pub use value_objects::{Country, Currency, Email, Price};

pub use common::{CategoryId, ProductId, SupplierId};
