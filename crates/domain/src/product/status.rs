//! Product lifecycle states.

use serde::{Deserialize, Serialize};

/// The status of a product in its lifecycle.
///
/// State transitions:
/// ```text
/// Created ──► Sold ──┬──► Returned
///                    └──► Canceled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductStatus {
    /// Product is in stock.
    #[default]
    Created = 1,

    /// Product has been sold.
    Sold = 2,

    /// Sale was canceled (terminal state).
    Canceled = 3,

    /// Product was returned after sale (terminal state).
    Returned = 4,
}

impl ProductStatus {
    /// Returns true if the product can be sold in this status.
    pub fn can_sell(&self) -> bool {
        matches!(self, ProductStatus::Created)
    }

    /// Returns true if the product can be returned in this status.
    pub fn can_return(&self) -> bool {
        matches!(self, ProductStatus::Sold)
    }

    /// Returns true if the sale can be canceled in this status.
    pub fn can_cancel(&self) -> bool {
        matches!(self, ProductStatus::Sold)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProductStatus::Canceled | ProductStatus::Returned)
    }

    /// Returns the numeric code of this status.
    pub fn code(&self) -> i16 {
        *self as i16
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Created => "Created",
            ProductStatus::Sold => "Sold",
            ProductStatus::Canceled => "Canceled",
            ProductStatus::Returned => "Returned",
        }
    }

    /// Parses a status name as produced by [`ProductStatus::as_str`].
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Created" => Some(ProductStatus::Created),
            "Sold" => Some(ProductStatus::Sold),
            "Canceled" => Some(ProductStatus::Canceled),
            "Returned" => Some(ProductStatus::Returned),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
