//! Commands and queries with exactly one consumer.

use async_trait::async_trait;
use common::RequestContext;

use crate::{Mediator, MediatorError};

/// A command or query carrying its own response type.
///
/// The error type must be able to represent a [`MediatorError`] so that
/// configuration problems surface through the same channel as handler
/// failures.
pub trait Request: Send + 'static {
    /// Value produced by the single handler.
    type Response: Send + 'static;

    /// Failure type propagated to the caller of [`Mediator::send`].
    type Error: From<MediatorError> + Send + 'static;
}

/// Handles one concrete request type.
///
/// The handler receives the mediator that dispatched it so it can open
/// units of work that publish through the same handler table.
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    async fn handle(
        &self,
        request: R,
        mediator: &Mediator,
        ctx: &RequestContext,
    ) -> Result<R::Response, R::Error>;
}
