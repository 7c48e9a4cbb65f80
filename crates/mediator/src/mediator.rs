//! Request and notification dispatch.

use std::any::{Any, type_name};
use std::panic::AssertUnwindSafe;

use common::RequestContext;
use futures_util::FutureExt;

use crate::notification::Notification;
use crate::registry::{HandlerRegistry, RegistryBuilder};
use crate::request::Request;

/// Summary of one publish call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Number of handlers that were invoked.
    pub handlers_invoked: usize,
    /// Number of those handlers that returned an error or panicked.
    pub handlers_failed: usize,
}

impl PublishOutcome {
    /// Returns true if every invoked handler succeeded.
    pub fn is_clean(&self) -> bool {
        self.handlers_failed == 0
    }
}

/// Dispatches requests to their single handler and notifications to all of theirs.
///
/// The handler table is fixed at construction and shared read-only, so a
/// mediator can sit behind an `Arc` and be used from any task.
pub struct Mediator {
    registry: HandlerRegistry,
}

impl Mediator {
    /// Creates a mediator over a frozen registry.
    pub fn new(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    /// Starts declaring handlers.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Returns the handler table.
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Sends a request to its single handler and returns the handler's result.
    ///
    /// Fails with a configuration error, before any handler runs, when the
    /// request type has zero or several handlers. Handler errors are returned
    /// to the caller unchanged.
    #[tracing::instrument(
        skip_all,
        fields(
            request_type = type_name::<R>(),
            correlation_id = %ctx.correlation_id(),
        )
    )]
    pub async fn send<R: Request>(
        &self,
        request: R,
        ctx: &RequestContext,
    ) -> Result<R::Response, R::Error> {
        let handler = self.registry.request_handler::<R>().inspect_err(|e| {
            tracing::error!(error = %e, "request dispatch misconfigured");
            metrics::counter!("mediator_configuration_errors").increment(1);
        })?;

        metrics::counter!("mediator_requests_sent").increment(1);
        handler.handle(request, self, ctx).await
    }

    /// Publishes a notification to every handler registered for its type.
    ///
    /// Handlers run one at a time in registration order. A handler that
    /// returns an error or panics is logged and counted; the remaining
    /// handlers still run and nothing is propagated to the caller.
    #[tracing::instrument(
        skip_all,
        fields(
            event_type = notification.notification_type(),
            correlation_id = %ctx.correlation_id(),
        )
    )]
    pub async fn publish<N: Notification>(
        &self,
        notification: N,
        ctx: &RequestContext,
    ) -> PublishOutcome {
        let event_type = notification.notification_type();
        let handlers = self.registry.notification_handlers::<N>();
        let mut outcome = PublishOutcome::default();

        metrics::counter!("mediator_notifications_published", "event_type" => event_type)
            .increment(1);

        if handlers.is_empty() {
            tracing::debug!("no handlers registered");
            return outcome;
        }

        for handler in handlers {
            let name = handler.name();
            outcome.handlers_invoked += 1;

            let result = AssertUnwindSafe(handler.handle(&notification, self, ctx))
                .catch_unwind()
                .await;

            match result {
                Ok(Ok(())) => {
                    tracing::debug!(handler = name, "handler completed");
                }
                Ok(Err(e)) => {
                    outcome.handlers_failed += 1;
                    tracing::error!(handler = name, error = %e, "notification handler failed");
                    metrics::counter!("mediator_handler_failures", "handler" => name)
                        .increment(1);
                }
                Err(panic) => {
                    outcome.handlers_failed += 1;
                    tracing::error!(
                        handler = name,
                        panic = panic_message(panic.as_ref()),
                        "notification handler panicked"
                    );
                    metrics::counter!("mediator_handler_panics", "handler" => name).increment(1);
                }
            }
        }

        outcome
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoxError, MediatorError, NotificationHandler, RequestHandler};
    use async_trait::async_trait;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, PartialEq)]
    enum EchoError {
        Mediator(MediatorError),
        Rejected(String),
    }

    impl From<MediatorError> for EchoError {
        fn from(e: MediatorError) -> Self {
            EchoError::Mediator(e)
        }
    }

    struct Echo(String);

    impl Request for Echo {
        type Response = String;
        type Error = EchoError;
    }

    struct EchoHandler {
        calls: Arc<Mutex<u32>>,
    }

    #[async_trait]
    impl RequestHandler<Echo> for EchoHandler {
        async fn handle(
            &self,
            request: Echo,
            _mediator: &Mediator,
            _ctx: &RequestContext,
        ) -> Result<String, EchoError> {
            *self.calls.lock().unwrap() += 1;
            if request.0.is_empty() {
                return Err(EchoError::Rejected("empty".to_string()));
            }
            Ok(request.0)
        }
    }

    struct Tick(u32);

    impl Notification for Tick {
        fn notification_type(&self) -> &'static str {
            "Tick"
        }
    }

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<(&'static str, u32)>>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationHandler<Tick> for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn handle(
            &self,
            notification: &Tick,
            _mediator: &Mediator,
            _ctx: &RequestContext,
        ) -> Result<(), BoxError> {
            self.log.lock().unwrap().push((self.name, notification.0));
            if self.fail {
                return Err(format!("{} failed", self.name).into());
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn send_returns_handler_result_unmodified() {
        let calls = Arc::new(Mutex::new(0));
        let mediator = Mediator::new(
            Mediator::builder()
                .request::<Echo, _>(EchoHandler {
                    calls: Arc::clone(&calls),
                })
                .build(),
        );

        let response = mediator
            .send(Echo("hello".to_string()), &RequestContext::system())
            .await
            .unwrap();

        assert_eq!(response, "hello");
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn send_propagates_handler_error() {
        let calls = Arc::new(Mutex::new(0));
        let mediator = Mediator::new(
            Mediator::builder()
                .request::<Echo, _>(EchoHandler {
                    calls: Arc::clone(&calls),
                })
                .build(),
        );

        let err = mediator
            .send(Echo(String::new()), &RequestContext::system())
            .await
            .unwrap_err();

        assert_eq!(err, EchoError::Rejected("empty".to_string()));
    }

    #[tokio::test]
    async fn send_without_handler_is_configuration_error() {
        let mediator = Mediator::new(Mediator::builder().build());

        let err = mediator
            .send(Echo("hello".to_string()), &RequestContext::system())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EchoError::Mediator(MediatorError::NoHandler { .. })
        ));
    }

    #[tokio::test]
    async fn publish_runs_handlers_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let recorder = |name| Recorder {
            name,
            log: Arc::clone(&log),
            fail: false,
        };
        let mediator = Mediator::new(
            Mediator::builder()
                .notification::<Tick, _>(recorder("first"))
                .notification::<Tick, _>(recorder("second"))
                .notification::<Tick, _>(recorder("third"))
                .build(),
        );

        let outcome = mediator.publish(Tick(7), &RequestContext::system()).await;

        assert_eq!(outcome.handlers_invoked, 3);
        assert!(outcome.is_clean());
        assert_eq!(
            *log.lock().unwrap(),
            vec![("first", 7), ("second", 7), ("third", 7)]
        );
    }

    #[tokio::test]
    async fn publish_without_handlers_is_a_no_op() {
        let mediator = Mediator::new(Mediator::builder().build());

        let outcome = mediator.publish(Tick(1), &RequestContext::system()).await;

        assert_eq!(outcome, PublishOutcome::default());
    }

    #[test]
    fn publish_is_counted_even_without_handlers() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let mediator = Mediator::new(Mediator::builder().build());
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        metrics::with_local_recorder(&recorder, || {
            runtime.block_on(mediator.publish(Tick(1), &RequestContext::system()))
        });

        let rendered = handle.render();
        assert!(rendered.contains("mediator_notifications_published"));
        assert!(rendered.contains("event_type=\"Tick\""));
    }

    #[test]
    fn panic_message_reads_common_payloads() {
        let s: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(s.as_ref()), "boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(owned.as_ref()), "bang");
        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
    }
}
