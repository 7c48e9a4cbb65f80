//! Supplier entity.

use chrono::{DateTime, Utc};
use common::SupplierId;

use crate::{Country, Currency, DomainError, Email, Entity, EventQueue, SupplierLink};

/// A company products are bought from.
///
/// All fields are validated at construction and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Supplier {
    id: SupplierId,
    name: String,
    email: Email,
    currency: Currency,
    country: Country,
    created_at: DateTime<Utc>,
    events: EventQueue,
}

impl Supplier {
    /// Creates a new supplier.
    pub fn new(
        name: impl Into<String>,
        email: Email,
        currency: Currency,
        country: Country,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("Name cannot be empty."));
        }

        Ok(Self {
            id: SupplierId::new(),
            name,
            email,
            currency,
            country,
            created_at: Utc::now(),
            events: EventQueue::new(),
        })
    }

    /// Rebuilds a supplier from persisted state. No validation, no events.
    pub fn restore(
        id: SupplierId,
        name: String,
        email: Email,
        currency: Currency,
        country: Country,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            currency,
            country,
            created_at,
            events: EventQueue::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Settlement currency for acquisition costs.
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn country(&self) -> &Country {
        &self.country
    }

    /// The view of this supplier stored on its products.
    pub fn link(&self) -> SupplierLink {
        SupplierLink {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn entity_type() -> &'static str {
        "Supplier"
    }

    fn id(&self) -> SupplierId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn event_queue(&self) -> &EventQueue {
        &self.events
    }

    fn event_queue_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supplier(name: &str) -> Result<Supplier, DomainError> {
        Supplier::new(
            name,
            Email::new("sales@acme.test").unwrap(),
            Currency::from_code("EUR").unwrap(),
            Country::from_code("DE").unwrap(),
        )
    }

    #[test]
    fn new_supplier_has_no_pending_events() {
        let supplier = supplier("Acme").unwrap();
        assert_eq!(supplier.name(), "Acme");
        assert_eq!(supplier.currency().code(), "EUR");
        assert_eq!(supplier.country().code(), "DE");
        assert!(!supplier.has_events());
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = supplier("  ").unwrap_err();
        assert_eq!(err.to_string(), "Name cannot be empty.");
    }

    #[test]
    fn link_carries_contact_data() {
        let supplier = supplier("Acme").unwrap();
        let link = supplier.link();
        assert_eq!(link.id, supplier.id());
        assert_eq!(link.email.as_str(), "sales@acme.test");
    }
}
