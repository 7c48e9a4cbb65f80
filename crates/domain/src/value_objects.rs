//! Value objects shared by the inventory entities.

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// A validated contact email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Validates and wraps an email address.
    ///
    /// The address must be non-blank and contain `@`.
    pub fn new(address: impl Into<String>) -> Result<Self, DomainError> {
        let address = address.into();
        let trimmed = address.trim();
        if trimmed.is_empty() || !trimmed.contains('@') {
            return Err(DomainError::InvalidEmail);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO 4217 style three-letter currency code, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Parses a currency code. Exactly three non-blank characters are required.
    pub fn from_code(code: &str) -> Result<Self, DomainError> {
        if code.trim().is_empty() {
            return Err(DomainError::EmptyCurrencyCode);
        }
        if code.chars().count() != 3 {
            return Err(DomainError::InvalidCurrency {
                code: code.to_string(),
            });
        }
        Ok(Self(code.to_uppercase()))
    }

    /// US dollars, the reference currency for normalised costs.
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Two-letter country code, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Country(String);

impl Country {
    /// Parses a country code. Exactly two non-blank characters are required.
    pub fn from_code(code: &str) -> Result<Self, DomainError> {
        if code.trim().is_empty() {
            return Err(DomainError::EmptyCountryCode);
        }
        if code.chars().count() != 2 {
            return Err(DomainError::InvalidCountry {
                code: code.to_string(),
            });
        }
        Ok(Self(code.to_uppercase()))
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative amount of money in a specific currency.
///
/// Amounts are held in minor units (cents) to avoid floating point issues.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    amount_cents: i64,
    currency: Currency,
}

impl Price {
    /// Creates a price. Negative amounts are rejected.
    pub fn new(amount_cents: i64, currency: Currency) -> Result<Self, DomainError> {
        if amount_cents < 0 {
            return Err(DomainError::NegativePrice { amount_cents });
        }
        Ok(Self {
            amount_cents,
            currency,
        })
    }

    /// A zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount_cents: 0,
            currency,
        }
    }

    pub fn amount_cents(&self) -> i64 {
        self.amount_cents
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{:02} {}",
            self.amount_cents / 100,
            self.amount_cents % 100,
            self.currency
        )
    }
}
