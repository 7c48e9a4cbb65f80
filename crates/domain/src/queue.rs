//! Ordered buffer of pending domain events owned by one entity.

use crate::DomainEvent;

/// Pending events in insertion order.
///
/// Reads hand out owned snapshots, so a snapshot never changes when the live
/// queue is appended to or cleared later. Each snapshot costs one clone per
/// pending event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventQueue {
    pending: Vec<DomainEvent>,
}

impl EventQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event at the end of the queue.
    pub fn push(&mut self, event: DomainEvent) {
        self.pending.push(event);
    }

    /// Removes the first event equal to `event`.
    ///
    /// Returns false, and leaves the queue untouched, if there is none.
    pub fn remove(&mut self, event: &DomainEvent) -> bool {
        match self.pending.iter().position(|e| e == event) {
            Some(index) => {
                self.pending.remove(index);
                true
            }
            None => false,
        }
    }

    /// Empties the queue. Clearing an empty queue is a no-op.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Returns a copy of the pending events in insertion order.
    pub fn snapshot(&self) -> Vec<DomainEvent> {
        self.pending.clone()
    }

    /// Moves every pending event out, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
