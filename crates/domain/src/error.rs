//! Domain error types.

use common::ProductId;
use thiserror::Error;

use crate::ProductStatus;

/// Domain-rule violations raised by entities and value objects.
///
/// Every variant is raised before any state change or event is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    #[error("Invalid email address.")]
    InvalidEmail,

    #[error("Currency code cannot be empty.")]
    EmptyCurrencyCode,

    #[error("Country code cannot be empty.")]
    EmptyCountryCode,

    #[error("Invalid currency code '{code}': must be exactly 3 characters.")]
    InvalidCurrency { code: String },

    #[error("Invalid country code '{code}': must be exactly 2 characters.")]
    InvalidCountry { code: String },

    #[error("Price cannot be negative: {amount_cents}")]
    NegativePrice { amount_cents: i64 },

    /// The product was already sold.
    #[error("Product {0} has already been sold")]
    AlreadySold(ProductId),

    /// Canceled and returned products are closed for sale.
    #[error("Cancelled and returned products cannot be sold")]
    ProductClosed { status: ProductStatus },

    /// The requested lifecycle transition is not allowed from the current status.
    #[error("Invalid status transition: cannot {action} a product in {current_status} status")]
    InvalidStatusTransition {
        current_status: ProductStatus,
        action: &'static str,
    },

    /// The warehouse identifier is assigned once.
    #[error("Product {product_id} is already linked to warehouse product {existing}")]
    WmsProductIdAlreadySet {
        product_id: ProductId,
        existing: String,
    },
}

impl DomainError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }
}
