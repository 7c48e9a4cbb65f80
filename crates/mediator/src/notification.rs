//! Fan-out notifications.

use async_trait::async_trait;
use common::RequestContext;

use crate::{BoxError, Mediator};

/// A fact published to zero or more handlers.
pub trait Notification: Send + Sync + 'static {
    /// Stable name used in logs and metrics.
    fn notification_type(&self) -> &'static str;
}

/// Reacts to one notification type.
///
/// Failures are reported back to the mediator, which logs them and carries
/// on with the remaining handlers. They never reach the publisher's caller.
#[async_trait]
pub trait NotificationHandler<N: Notification>: Send + Sync {
    /// Returns the name of this handler.
    fn name(&self) -> &'static str;

    /// Handles a single notification.
    async fn handle(
        &self,
        notification: &N,
        mediator: &Mediator,
        ctx: &RequestContext,
    ) -> Result<(), BoxError>;
}
