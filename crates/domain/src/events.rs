//! Domain events raised by the inventory entities.

use chrono::{DateTime, Utc};
use common::{CategoryId, ProductId, RequestContext, SupplierId};
use mediator::{Mediator, Notification, PublishOutcome};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Email, ProductStatus};

/// Data every event carries, fixed when the event is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    occurred_at: DateTime<Utc>,
    idempotency_key: Uuid,
}

impl EventMetadata {
    /// Stamps a new event with the current time and a random idempotency key.
    pub fn new() -> Self {
        Self {
            occurred_at: Utc::now(),
            idempotency_key: Uuid::new_v4(),
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Consumers use this key to drop duplicates.
    pub fn idempotency_key(&self) -> Uuid {
        self.idempotency_key
    }
}

impl Default for EventMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// The supplier a product was bought from, as seen by the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierLink {
    pub id: SupplierId,
    pub name: String,
    pub email: Email,
}

/// The category a product belongs to, as seen by the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLink {
    pub id: CategoryId,
    pub name: String,
    pub shortcode: String,
}

/// Product state captured at the moment an event was raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub description: String,
    pub supplier: SupplierLink,
    pub category: CategoryLink,
    pub status: ProductStatus,
    pub acquire_date: DateTime<Utc>,
    pub sold_date: Option<DateTime<Utc>>,
    pub wms_product_id: Option<String>,
}

/// A product entered the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub metadata: EventMetadata,
    pub product: ProductSnapshot,
}

/// A product was sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSold {
    pub metadata: EventMetadata,
    pub product: ProductSnapshot,
}

impl Notification for ProductCreated {
    fn notification_type(&self) -> &'static str {
        "ProductCreated"
    }
}

impl Notification for ProductSold {
    fn notification_type(&self) -> &'static str {
        "ProductSold"
    }
}

/// Every event an entity can queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DomainEvent {
    ProductCreated(ProductCreated),
    ProductSold(ProductSold),
}

impl DomainEvent {
    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::ProductCreated(e) => e.notification_type(),
            DomainEvent::ProductSold(e) => e.notification_type(),
        }
    }

    pub fn metadata(&self) -> &EventMetadata {
        match self {
            DomainEvent::ProductCreated(e) => &e.metadata,
            DomainEvent::ProductSold(e) => &e.metadata,
        }
    }

    /// Publishes the concrete event so handlers are resolved by its own type.
    pub async fn publish(self, mediator: &Mediator, ctx: &RequestContext) -> PublishOutcome {
        match self {
            DomainEvent::ProductCreated(e) => mediator.publish(e, ctx).await,
            DomainEvent::ProductSold(e) => mediator.publish(e, ctx).await,
        }
    }
}

impl From<ProductCreated> for DomainEvent {
    fn from(event: ProductCreated) -> Self {
        DomainEvent::ProductCreated(event)
    }
}

impl From<ProductSold> for DomainEvent {
    fn from(event: ProductSold) -> Self {
        DomainEvent::ProductSold(event)
    }
}
