//! In-process mediator for commands, queries and notifications.
//!
//! This crate provides:
//! - [`Request`] / [`RequestHandler`] for single-consumer commands and queries
//! - [`Notification`] / [`NotificationHandler`] for fan-out events
//! - [`RegistryBuilder`] to declare every handler once at startup
//! - [`Mediator`] to dispatch by the concrete request or notification type

pub mod error;
pub mod mediator;
pub mod notification;
pub mod registry;
pub mod request;

pub use error::{BoxError, MediatorError, Result};
pub use mediator::{Mediator, PublishOutcome};
pub use notification::{Notification, NotificationHandler};
pub use registry::{HandlerRegistry, RegistryBuilder};
pub use request::{Request, RequestHandler};
