//! Core entity trait.

use chrono::{DateTime, Utc};

use crate::{DomainEvent, EventQueue};

/// A persistent business object that records domain events as it changes.
///
/// State-changing methods on an entity validate first, mutate second and
/// queue an event last, so a rejected operation leaves both the state and
/// the queue untouched. The save interceptor drains the queue when the
/// entity is committed.
pub trait Entity: Send + Sync {
    /// Identifier type of this entity.
    type Id: Copy + Eq + std::fmt::Display + Send + Sync;

    /// Returns the entity type name used in logs and errors.
    fn entity_type() -> &'static str;

    /// Returns the entity's identifier.
    fn id(&self) -> Self::Id;

    /// When the entity was first constructed. Never changes afterwards.
    fn created_at(&self) -> DateTime<Utc>;

    /// Read access to the pending event queue.
    fn event_queue(&self) -> &EventQueue;

    /// Write access to the pending event queue.
    fn event_queue_mut(&mut self) -> &mut EventQueue;

    /// Appends an event to the pending queue without publishing it.
    fn add_event(&mut self, event: DomainEvent) {
        self.event_queue_mut().push(event);
    }

    /// Removes the first pending event equal to `event`, if any.
    fn remove_event(&mut self, event: &DomainEvent) -> bool {
        self.event_queue_mut().remove(event)
    }

    /// Drops every pending event.
    fn clear_events(&mut self) {
        self.event_queue_mut().clear();
    }

    /// Returns a snapshot of the pending events in the order they were added.
    fn events(&self) -> Vec<DomainEvent> {
        self.event_queue().snapshot()
    }

    /// Returns true if at least one event is pending.
    fn has_events(&self) -> bool {
        !self.event_queue().is_empty()
    }
}
