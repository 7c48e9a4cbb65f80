//! Tracking of entities touched by a unit of work.

use std::fmt;

use common::{CategoryId, ProductId, SupplierId};
use domain::{Category, DomainEvent, Entity, Product, Supplier};
use uuid::Uuid;

use crate::store::{Change, ChangeSet};

/// Any entity the persistence layer knows how to store.
#[derive(Debug, Clone)]
pub enum TrackedEntity {
    Product(Product),
    Category(Category),
    Supplier(Supplier),
}

impl TrackedEntity {
    /// Returns the identity of the wrapped entity.
    pub fn key(&self) -> EntityKey {
        match self {
            Self::Product(p) => EntityKey::Product(p.id()),
            Self::Category(c) => EntityKey::Category(c.id()),
            Self::Supplier(s) => EntityKey::Supplier(s.id()),
        }
    }

    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::Product(_) => Product::entity_type(),
            Self::Category(_) => Category::entity_type(),
            Self::Supplier(_) => Supplier::entity_type(),
        }
    }

    /// Number of events waiting on the wrapped entity.
    pub fn pending_events(&self) -> usize {
        match self {
            Self::Product(p) => p.event_queue().len(),
            Self::Category(c) => c.event_queue().len(),
            Self::Supplier(s) => s.event_queue().len(),
        }
    }

    /// Reads the entity's queue and empties it in one step.
    fn take_events(&mut self) -> Vec<DomainEvent> {
        match self {
            Self::Product(p) => p.event_queue_mut().drain(),
            Self::Category(c) => c.event_queue_mut().drain(),
            Self::Supplier(s) => s.event_queue_mut().drain(),
        }
    }
}

impl From<Product> for TrackedEntity {
    fn from(product: Product) -> Self {
        Self::Product(product)
    }
}

impl From<Category> for TrackedEntity {
    fn from(category: Category) -> Self {
        Self::Category(category)
    }
}

impl From<Supplier> for TrackedEntity {
    fn from(supplier: Supplier) -> Self {
        Self::Supplier(supplier)
    }
}

/// Typed identity of a tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Product(ProductId),
    Category(CategoryId),
    Supplier(SupplierId),
}

impl EntityKey {
    pub fn as_uuid(&self) -> Uuid {
        match self {
            Self::Product(id) => id.as_uuid(),
            Self::Category(id) => id.as_uuid(),
            Self::Supplier(id) => id.as_uuid(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product(id) => write!(f, "Product {id}"),
            Self::Category(id) => write!(f, "Category {id}"),
            Self::Supplier(id) => write!(f, "Supplier {id}"),
        }
    }
}

/// What the next commit should do with a tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    Added,
    Modified,
    Deleted,
}

impl EntityState {
    /// State after tracking an already tracked entity again.
    fn merge(self, next: EntityState) -> EntityState {
        match (self, next) {
            (_, EntityState::Deleted) => EntityState::Deleted,
            (EntityState::Added, _) => EntityState::Added,
            (_, next) => next,
        }
    }
}

/// Entities touched since the last save, in the order they were first tracked.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    entries: Vec<(EntityState, TrackedEntity)>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking an entity, or replaces the tracked copy with the same key.
    ///
    /// Re-tracking keeps the entity's original position. Pending events of the
    /// replaced copy are carried over ahead of the new copy's events.
    pub fn track(&mut self, mut entity: TrackedEntity, state: EntityState) {
        let key = entity.key();
        match self.entries.iter_mut().find(|(_, e)| e.key() == key) {
            Some((existing_state, existing)) => {
                let mut carried = existing.take_events();
                carried.extend(entity.take_events());
                requeue(&mut entity, carried);
                *existing_state = existing_state.merge(state);
                *existing = entity;
            }
            None => self.entries.push((state, entity)),
        }
    }

    pub fn state_of(&self, key: EntityKey) -> Option<EntityState> {
        self.entries
            .iter()
            .find(|(_, e)| e.key() == key)
            .map(|(state, _)| *state)
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.entries.iter().find_map(|(_, e)| match e {
            TrackedEntity::Product(p) if p.id() == id => Some(p),
            _ => None,
        })
    }

    /// Mutable access to a tracked product. Marks an unchanged product as modified.
    pub fn product_mut(&mut self, id: ProductId) -> Option<&mut Product> {
        self.entries.iter_mut().find_map(|(state, e)| match e {
            TrackedEntity::Product(p) if p.id() == id => {
                *state = state.merge(EntityState::Modified);
                Some(p)
            }
            _ => None,
        })
    }

    /// Collects every pending event, entity by entity in tracking order, and
    /// clears each queue as it is read.
    pub fn collect_events(&mut self) -> CollectedEvents {
        let batches = self
            .entries
            .iter_mut()
            .map(|(_, entity)| (entity.key(), entity.take_events()))
            .filter(|(_, events)| !events.is_empty())
            .collect();
        CollectedEvents { batches }
    }

    /// Puts collected events back onto their entities, ahead of anything
    /// queued since, so the next save publishes them.
    pub fn restore_events(&mut self, collected: CollectedEvents) {
        for (key, events) in collected.batches {
            match self.entries.iter_mut().find(|(_, e)| e.key() == key) {
                Some((_, entity)) => {
                    let newer = entity.take_events();
                    requeue(entity, events);
                    requeue(entity, newer);
                }
                None => tracing::warn!(
                    entity = %key,
                    dropped = events.len(),
                    "entity no longer tracked, events dropped"
                ),
            }
        }
    }

    /// Returns the writes the next commit has to apply.
    pub fn change_set(&self) -> ChangeSet {
        self.entries
            .iter()
            .map(|(state, entity)| Change {
                state: *state,
                entity: entity.clone(),
            })
            .collect()
    }

    /// Detaches every tracked entity.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of events waiting across all tracked entities.
    pub fn pending_events(&self) -> usize {
        self.entries.iter().map(|(_, e)| e.pending_events()).sum()
    }
}

/// Events drained from tracked entities, grouped by the entity they came from.
#[derive(Debug, Default)]
pub struct CollectedEvents {
    batches: Vec<(EntityKey, Vec<DomainEvent>)>,
}

impl CollectedEvents {
    pub fn len(&self) -> usize {
        self.batches.iter().map(|(_, events)| events.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Events in publish order.
    pub fn iter(&self) -> impl Iterator<Item = &DomainEvent> {
        self.batches.iter().flat_map(|(_, events)| events)
    }
}

impl IntoIterator for CollectedEvents {
    type Item = DomainEvent;
    type IntoIter = std::vec::IntoIter<DomainEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.batches
            .into_iter()
            .flat_map(|(_, events)| events)
            .collect::<Vec<_>>()
            .into_iter()
    }
}

fn requeue(entity: &mut TrackedEntity, events: Vec<DomainEvent>) {
    for event in events {
        match entity {
            TrackedEntity::Product(p) => p.add_event(event),
            TrackedEntity::Category(c) => c.add_event(event),
            TrackedEntity::Supplier(s) => s.add_event(event),
        }
    }
}
