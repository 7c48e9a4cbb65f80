//! Reactions to domain events.
//!
//! Each handler reports failures by returning an error; the mediator logs
//! it and moves on to the next handler.

mod audit;
mod email;
mod warehouse;

pub use audit::{ProductCreatedAuditHandler, ProductSoldAuditHandler};
pub use email::ProductSoldEmailHandler;
pub use warehouse::{ProductCreatedWarehouseHandler, ProductSoldWarehouseHandler};
