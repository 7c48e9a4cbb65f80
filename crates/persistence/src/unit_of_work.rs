//! Unit of work with save-time domain event dispatch.

use std::sync::Arc;
use std::time::Instant;

use common::{ProductId, RequestContext};
use domain::Product;
use mediator::Mediator;
use tokio::runtime::Handle;

use crate::{
    Result,
    store::EntityStore,
    tracker::{ChangeTracker, EntityState, TrackedEntity},
};

/// Result of one successful save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Entities written by the commit.
    pub entities_written: usize,
    /// Domain events handed to the mediator.
    pub events_dispatched: usize,
    /// Notification handlers that failed while those events were published.
    pub handler_failures: usize,
}

/// Collects entity changes and commits them together.
///
/// Saving is also the point where domain events leave their entities:
/// [`UnitOfWork::save_changes`] drains every tracked entity's queue, commits,
/// and then publishes the drained events one after another through the
/// mediator. Handlers run after the commit, so they see the saved state and
/// may open a unit of work of their own.
pub struct UnitOfWork<'a> {
    store: Arc<dyn EntityStore>,
    mediator: &'a Mediator,
    ctx: &'a RequestContext,
    tracker: ChangeTracker,
}

impl<'a> UnitOfWork<'a> {
    pub fn new(store: Arc<dyn EntityStore>, mediator: &'a Mediator, ctx: &'a RequestContext) -> Self {
        Self {
            store,
            mediator,
            ctx,
            tracker: ChangeTracker::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    /// Tracks a new entity for insertion.
    pub fn add(&mut self, entity: impl Into<TrackedEntity>) {
        self.tracker.track(entity.into(), EntityState::Added);
    }

    /// Tracks a changed entity for update.
    pub fn update(&mut self, entity: impl Into<TrackedEntity>) {
        self.tracker.track(entity.into(), EntityState::Modified);
    }

    /// Tracks an entity for deletion. Its pending events are still published.
    pub fn remove(&mut self, entity: impl Into<TrackedEntity>) {
        self.tracker.track(entity.into(), EntityState::Deleted);
    }

    /// Loads a product into the unit of work and returns it for mutation.
    ///
    /// Returns the tracked copy when the product is already tracked.
    pub async fn product_mut(&mut self, id: ProductId) -> Result<Option<&mut Product>> {
        if self.tracker.product(id).is_none() {
            match self.store.get_product(id).await? {
                Some(product) => self.tracker.track(product.into(), EntityState::Modified),
                None => return Ok(None),
            }
        }
        Ok(self.tracker.product_mut(id))
    }

    /// Commits every tracked change, then publishes the collected domain events.
    ///
    /// Events are taken from the entities in tracking order, each entity's
    /// queue in insertion order, and every queue is empty before the first
    /// handler runs. A failed commit publishes nothing and returns the store
    /// error; the entities stay tracked with their events back in their
    /// queues, so a later save commits and publishes both.
    /// Handler failures are counted in the outcome and never fail the save.
    #[tracing::instrument(
        skip(self),
        fields(
            tracked = self.tracker.len(),
            correlation_id = %self.ctx.correlation_id(),
        )
    )]
    pub async fn save_changes(&mut self) -> Result<SaveOutcome> {
        let started = Instant::now();
        let events = self.tracker.collect_events();
        let changes = self.tracker.change_set();

        let entities_written = if changes.is_empty() {
            0
        } else {
            match self.store.commit(changes).await {
                Ok(written) => {
                    metrics::counter!("persistence_commits").increment(1);
                    written
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        pending_events = events.len(),
                        "commit failed, events returned to their entities"
                    );
                    self.tracker.restore_events(events);
                    return Err(e);
                }
            }
        };
        self.tracker.clear();

        let mut outcome = SaveOutcome {
            entities_written,
            ..SaveOutcome::default()
        };
        for event in events {
            let event_type = event.event_type();
            let published = event.publish(self.mediator, self.ctx).await;
            tracing::debug!(
                event_type,
                handlers = published.handlers_invoked,
                failed = published.handlers_failed,
                "domain event dispatched"
            );
            outcome.events_dispatched += 1;
            outcome.handler_failures += published.handlers_failed;
        }

        metrics::counter!("persistence_events_dispatched").increment(outcome.events_dispatched as u64);
        metrics::histogram!("unit_of_work_save_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        if outcome.handler_failures > 0 {
            tracing::warn!(
                failures = outcome.handler_failures,
                "saved with failing event handlers"
            );
        }

        Ok(outcome)
    }

    /// Blocking variant of [`UnitOfWork::save_changes`] for synchronous callers.
    ///
    /// Must not be called from within an async context of the same runtime.
    pub fn save_changes_blocking(&mut self, handle: &Handle) -> Result<SaveOutcome> {
        handle.block_on(self.save_changes())
    }
}
