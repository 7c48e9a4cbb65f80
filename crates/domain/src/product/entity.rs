//! Product entity implementation.

use chrono::{DateTime, Utc};
use common::ProductId;

use crate::{
    Category, CategoryLink, DomainError, Entity, EventMetadata, EventQueue, Price,
    ProductCreated, ProductSnapshot, ProductSold, Supplier, SupplierLink,
};

use super::ProductStatus;

/// Longest description a product may carry.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Persisted state of a product, used to rebuild it from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: ProductId,
    pub description: String,
    pub supplier: SupplierLink,
    pub category: CategoryLink,
    pub acquisition_cost: Price,
    pub acquisition_cost_usd: Price,
    pub status: ProductStatus,
    pub acquire_date: DateTime<Utc>,
    pub sold_date: Option<DateTime<Utc>>,
    pub cancel_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub wms_product_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A single inventory item with a sale lifecycle.
///
/// Supplier and category are fixed at creation. After that only the status,
/// its matching date and the warehouse identifier change.
#[derive(Debug, Clone)]
pub struct Product {
    id: ProductId,
    description: String,
    supplier: SupplierLink,
    category: CategoryLink,
    acquisition_cost: Price,
    acquisition_cost_usd: Price,
    status: ProductStatus,
    acquire_date: DateTime<Utc>,
    sold_date: Option<DateTime<Utc>>,
    cancel_date: Option<DateTime<Utc>>,
    return_date: Option<DateTime<Utc>>,
    wms_product_id: Option<String>,
    created_at: DateTime<Utc>,
    events: EventQueue,
}

// Construction
impl Product {
    /// Creates a product in `Created` status and queues [`ProductCreated`].
    pub fn new(
        description: impl Into<String>,
        acquisition_cost: Price,
        acquisition_cost_usd: Price,
        supplier: &Supplier,
        category: &Category,
    ) -> Result<Self, DomainError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(DomainError::validation("Description cannot be empty."));
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(DomainError::validation(format!(
                "Description must not exceed {MAX_DESCRIPTION_LEN} characters."
            )));
        }

        let now = Utc::now();
        let mut product = Self {
            id: ProductId::new(),
            description,
            supplier: supplier.link(),
            category: category.link(),
            acquisition_cost,
            acquisition_cost_usd,
            status: ProductStatus::Created,
            acquire_date: now,
            sold_date: None,
            cancel_date: None,
            return_date: None,
            wms_product_id: None,
            created_at: now,
            events: EventQueue::new(),
        };

        let event = ProductCreated {
            metadata: EventMetadata::new(),
            product: product.snapshot(),
        };
        product.add_event(event.into());

        Ok(product)
    }

    /// Rebuilds a product from persisted state. No validation, no events.
    pub fn restore(record: ProductRecord) -> Self {
        Self {
            id: record.id,
            description: record.description,
            supplier: record.supplier,
            category: record.category,
            acquisition_cost: record.acquisition_cost,
            acquisition_cost_usd: record.acquisition_cost_usd,
            status: record.status,
            acquire_date: record.acquire_date,
            sold_date: record.sold_date,
            cancel_date: record.cancel_date,
            return_date: record.return_date,
            wms_product_id: record.wms_product_id,
            created_at: record.created_at,
            events: EventQueue::new(),
        }
    }

    /// Returns the persisted state of this product.
    pub fn to_record(&self) -> ProductRecord {
        ProductRecord {
            id: self.id,
            description: self.description.clone(),
            supplier: self.supplier.clone(),
            category: self.category.clone(),
            acquisition_cost: self.acquisition_cost.clone(),
            acquisition_cost_usd: self.acquisition_cost_usd.clone(),
            status: self.status,
            acquire_date: self.acquire_date,
            sold_date: self.sold_date,
            cancel_date: self.cancel_date,
            return_date: self.return_date,
            wms_product_id: self.wms_product_id.clone(),
            created_at: self.created_at,
        }
    }
}

// Query methods
impl Product {
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn supplier(&self) -> &SupplierLink {
        &self.supplier
    }

    pub fn category(&self) -> &CategoryLink {
        &self.category
    }

    /// Cost in the supplier's currency.
    pub fn acquisition_cost(&self) -> &Price {
        &self.acquisition_cost
    }

    /// Cost normalised to US dollars.
    pub fn acquisition_cost_usd(&self) -> &Price {
        &self.acquisition_cost_usd
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn acquire_date(&self) -> DateTime<Utc> {
        self.acquire_date
    }

    pub fn sold_date(&self) -> Option<DateTime<Utc>> {
        self.sold_date
    }

    pub fn cancel_date(&self) -> Option<DateTime<Utc>> {
        self.cancel_date
    }

    pub fn return_date(&self) -> Option<DateTime<Utc>> {
        self.return_date
    }

    /// Identifier assigned by the warehouse system, once known.
    pub fn wms_product_id(&self) -> Option<&str> {
        self.wms_product_id.as_deref()
    }

    /// Captures the current state for an event payload.
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            description: self.description.clone(),
            supplier: self.supplier.clone(),
            category: self.category.clone(),
            status: self.status,
            acquire_date: self.acquire_date,
            sold_date: self.sold_date,
            wms_product_id: self.wms_product_id.clone(),
        }
    }
}

// Lifecycle methods
impl Product {
    /// Marks the product as sold and queues [`ProductSold`].
    pub fn sell(&mut self) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::ProductClosed {
                status: self.status,
            });
        }
        if !self.status.can_sell() {
            return Err(DomainError::AlreadySold(self.id));
        }

        self.status = ProductStatus::Sold;
        self.sold_date = Some(Utc::now());

        let event = ProductSold {
            metadata: EventMetadata::new(),
            product: self.snapshot(),
        };
        self.add_event(event.into());

        Ok(())
    }

    /// Records that a sold product came back.
    pub fn mark_returned(&mut self) -> Result<(), DomainError> {
        if !self.status.can_return() {
            return Err(DomainError::InvalidStatusTransition {
                current_status: self.status,
                action: "return",
            });
        }

        self.status = ProductStatus::Returned;
        self.return_date = Some(Utc::now());
        Ok(())
    }

    /// Cancels the sale of a sold product.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        if !self.status.can_cancel() {
            return Err(DomainError::InvalidStatusTransition {
                current_status: self.status,
                action: "cancel",
            });
        }

        self.status = ProductStatus::Canceled;
        self.cancel_date = Some(Utc::now());
        Ok(())
    }

    /// Links the product to its warehouse-system record.
    ///
    /// Assigning the same identifier again is a no-op; a different one is rejected.
    pub fn set_wms_product_id(&mut self, wms_product_id: impl Into<String>) -> Result<(), DomainError> {
        let wms_product_id = wms_product_id.into();
        if wms_product_id.trim().is_empty() {
            return Err(DomainError::validation("WMS product id cannot be empty."));
        }

        match &self.wms_product_id {
            Some(existing) if *existing == wms_product_id => Ok(()),
            Some(existing) => Err(DomainError::WmsProductIdAlreadySet {
                product_id: self.id,
                existing: existing.clone(),
            }),
            None => {
                self.wms_product_id = Some(wms_product_id);
                Ok(())
            }
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn entity_type() -> &'static str {
        "Product"
    }

    fn id(&self) -> ProductId {
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
    use crate::{Country, Currency, DomainEvent, Email};

    fn supplier() -> Supplier {
        Supplier::new(
            "Acme",
            Email::new("sales@acme.test").unwrap(),
            Currency::from_code("EUR").unwrap(),
            Country::from_code("DE").unwrap(),
        )
        .unwrap()
    }

    fn product() -> Product {
        let supplier = supplier();
        let category = Category::new("Tools", "TOOL", None).unwrap();
        Product::new(
            "Widget",
            Price::new(1000, supplier.currency().clone()).unwrap(),
            Price::new(1100, Currency::usd()).unwrap(),
            &supplier,
            &category,
        )
        .unwrap()
    }

    #[test]
    fn new_product_is_created_with_one_event() {
        let product = product();

        assert_eq!(product.status(), ProductStatus::Created);
        assert_eq!(product.acquire_date(), product.created_at());
        assert!(product.sold_date().is_none());
        assert!(product.cancel_date().is_none());
        assert!(product.return_date().is_none());

        let events = product.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            DomainEvent::ProductCreated(e) => {
                assert_eq!(e.product.id, product.id());
                assert_eq!(e.product.description, "Widget");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn description_is_required() {
        let supplier = supplier();
        let category = Category::new("Tools", "TOOL", None).unwrap();
        let err = Product::new(
            "  ",
            Price::zero(Currency::usd()),
            Price::zero(Currency::usd()),
            &supplier,
            &category,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Description cannot be empty.");
    }

    #[test]
    fn description_length_is_capped() {
        let supplier = supplier();
        let category = Category::new("Tools", "TOOL", None).unwrap();
        let long = "x".repeat(MAX_DESCRIPTION_LEN + 1);
        let result = Product::new(
            long,
            Price::zero(Currency::usd()),
            Price::zero(Currency::usd()),
            &supplier,
            &category,
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn sell_from_created() {
        let mut product = product();
        product.clear_events();

        product.sell().unwrap();

        assert_eq!(product.status(), ProductStatus::Sold);
        assert!(product.sold_date().is_some());
        let events = product.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], DomainEvent::ProductSold(_)));
    }

    #[test]
    fn sold_event_snapshot_reflects_sale() {
        let mut product = product();
        product.clear_events();
        product.sell().unwrap();

        let DomainEvent::ProductSold(event) = &product.events()[0] else {
            panic!("expected ProductSold");
        };
        assert_eq!(event.product.status, ProductStatus::Sold);
        assert_eq!(event.product.sold_date, product.sold_date());
    }

    #[test]
    fn sell_twice_is_rejected_without_changes() {
        let mut product = product();
        product.sell().unwrap();
        product.clear_events();
        let sold_date = product.sold_date();

        let err = product.sell().unwrap_err();

        assert_eq!(err, DomainError::AlreadySold(product.id()));
        assert!(err.to_string().contains("already been sold"));
        assert_eq!(product.status(), ProductStatus::Sold);
        assert_eq!(product.sold_date(), sold_date);
        assert!(product.events().is_empty());
    }

    #[test]
    fn return_requires_sold() {
        let mut product = product();
        let before = product.events();

        let err = product.mark_returned().unwrap_err();

        assert!(matches!(
            err,
            DomainError::InvalidStatusTransition {
                current_status: ProductStatus::Created,
                action: "return"
            }
        ));
        assert_eq!(product.status(), ProductStatus::Created);
        assert!(product.return_date().is_none());
        assert_eq!(product.events(), before);
    }

    #[test]
    fn return_after_sale() {
        let mut product = product();
        product.sell().unwrap();
        product.clear_events();

        product.mark_returned().unwrap();

        assert_eq!(product.status(), ProductStatus::Returned);
        assert!(product.return_date().is_some());
        assert!(product.events().is_empty());
    }

    #[test]
    fn cancel_requires_sold() {
        let mut product = product();
        assert!(product.cancel().is_err());

        product.sell().unwrap();
        product.cancel().unwrap();
        assert_eq!(product.status(), ProductStatus::Canceled);
        assert!(product.cancel_date().is_some());
    }

    #[test]
    fn closed_products_cannot_be_sold() {
        let mut product = product();
        product.sell().unwrap();
        product.cancel().unwrap();
        product.clear_events();

        let err = product.sell().unwrap_err();

        assert_eq!(
            err.to_string(),
            "Cancelled and returned products cannot be sold"
        );
        assert_eq!(product.status(), ProductStatus::Canceled);
        assert!(product.events().is_empty());
    }

    #[test]
    fn wms_product_id_is_set_once() {
        let mut product = product();
        assert_eq!(product.wms_product_id(), None);

        product.set_wms_product_id("WMS-0001").unwrap();
        product.set_wms_product_id("WMS-0001").unwrap();
        assert_eq!(product.wms_product_id(), Some("WMS-0001"));

        let err = product.set_wms_product_id("WMS-0002").unwrap_err();
        assert!(matches!(err, DomainError::WmsProductIdAlreadySet { .. }));
        assert!(product.set_wms_product_id("").is_err());
    }

    #[test]
    fn record_roundtrip_drops_pending_events() {
        let product = product();
        let restored = Product::restore(product.to_record());

        assert_eq!(restored.id(), product.id());
        assert_eq!(restored.to_record(), product.to_record());
        assert!(!restored.has_events());
    }
}
