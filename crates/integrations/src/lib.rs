//! Outbound integrations used by domain event handlers.
//!
//! Every collaborator is a trait with two implementations: a real client
//! (HTTP via reqwest, SMTP via lettre) and an in-memory fake that records
//! calls and can be told to fail.

pub mod audit;
pub mod email;
pub mod error;
pub mod http;
pub mod warehouse;

pub use audit::{AuditLogRequest, AuditLogResponse, AuditService, HttpAuditService, InMemoryAuditService};
pub use email::{EmailMessage, EmailSender, InMemoryEmailSender, SmtpConfig, SmtpEmailSender};
pub use error::{IntegrationError, Result};
pub use http::build_client;
pub use warehouse::{
    HttpWarehouseService, InMemoryWarehouseService, WarehouseService, WmsDispatchResponse,
    WmsProductRequest, WmsProductResponse,
};
