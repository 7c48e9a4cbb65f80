//! Startup-time handler registration table.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use crate::notification::{Notification, NotificationHandler};
use crate::request::{Request, RequestHandler};
use crate::{MediatorError, Result};

type ErasedHandler = Box<dyn Any + Send + Sync>;

struct RequestEntry {
    handler_type: &'static str,
    handler: ErasedHandler,
}

struct NotificationEntry {
    handler: ErasedHandler,
}

/// Collects handler registrations before the mediator is built.
///
/// Every (request type -> handler) and (notification type -> handler) pair is
/// listed explicitly; nothing is discovered at runtime. Notification handlers
/// run in the order they are registered here.
#[derive(Default)]
pub struct RegistryBuilder {
    requests: HashMap<TypeId, (&'static str, Vec<RequestEntry>)>,
    notifications: HashMap<TypeId, Vec<NotificationEntry>>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler for request type `R`.
    ///
    /// Registering a second handler for the same request is accepted here and
    /// rejected when that request is sent.
    pub fn request<R, H>(mut self, handler: H) -> Self
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        let handler: Arc<dyn RequestHandler<R>> = Arc::new(handler);
        self.requests
            .entry(TypeId::of::<R>())
            .or_insert_with(|| (type_name::<R>(), Vec::new()))
            .1
            .push(RequestEntry {
                handler_type: type_name::<H>(),
                handler: Box::new(handler),
            });
        self
    }

    /// Appends a handler for notification type `N`.
    pub fn notification<N, H>(mut self, handler: H) -> Self
    where
        N: Notification,
        H: NotificationHandler<N> + 'static,
    {
        let handler: Arc<dyn NotificationHandler<N>> = Arc::new(handler);
        self.notifications
            .entry(TypeId::of::<N>())
            .or_default()
            .push(NotificationEntry {
                handler: Box::new(handler),
            });
        self
    }

    /// Freezes the registrations into a read-only registry.
    pub fn build(self) -> HandlerRegistry {
        for (request_type, entries) in self.requests.values() {
            if entries.len() > 1 {
                let handlers: Vec<_> = entries.iter().map(|e| e.handler_type).collect();
                tracing::warn!(
                    request_type,
                    ?handlers,
                    "request has more than one handler; sending it will fail"
                );
            }
        }

        HandlerRegistry {
            requests: self.requests,
            notifications: self.notifications,
        }
    }
}

/// Read-only mapping from request and notification types to handlers.
pub struct HandlerRegistry {
    requests: HashMap<TypeId, (&'static str, Vec<RequestEntry>)>,
    notifications: HashMap<TypeId, Vec<NotificationEntry>>,
}

impl HandlerRegistry {
    /// Creates a registry builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Returns the number of handlers registered for request type `R`.
    pub fn request_handler_count<R: Request>(&self) -> usize {
        self.requests
            .get(&TypeId::of::<R>())
            .map(|(_, entries)| entries.len())
            .unwrap_or(0)
    }

    /// Returns the number of handlers registered for notification type `N`.
    pub fn notification_handler_count<N: Notification>(&self) -> usize {
        self.notifications
            .get(&TypeId::of::<N>())
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Resolves the single handler for request type `R`.
    pub(crate) fn request_handler<R: Request>(&self) -> Result<Arc<dyn RequestHandler<R>>> {
        let request_type = type_name::<R>();
        let entries = match self.requests.get(&TypeId::of::<R>()) {
            Some((_, entries)) => entries.as_slice(),
            None => &[],
        };

        match entries {
            [] => Err(MediatorError::NoHandler { request_type }),
            [entry] => entry
                .handler
                .downcast_ref::<Arc<dyn RequestHandler<R>>>()
                .cloned()
                .ok_or(MediatorError::NoHandler { request_type }),
            _ => Err(MediatorError::MultipleHandlers {
                request_type,
                count: entries.len(),
            }),
        }
    }

    /// Resolves all handlers for notification type `N`, in registration order.
    pub(crate) fn notification_handlers<N: Notification>(
        &self,
    ) -> Vec<Arc<dyn NotificationHandler<N>>> {
        self.notifications
            .get(&TypeId::of::<N>())
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|e| e.handler.downcast_ref::<Arc<dyn NotificationHandler<N>>>())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoxError, Mediator};
    use async_trait::async_trait;
    use common::RequestContext;

    struct Ping;

    impl Request for Ping {
        type Response = &'static str;
        type Error = MediatorError;
    }

    struct Pong;

    #[async_trait]
    impl RequestHandler<Ping> for Pong {
        async fn handle(
            &self,
            _request: Ping,
            _mediator: &Mediator,
            _ctx: &RequestContext,
        ) -> std::result::Result<&'static str, MediatorError> {
            Ok("pong")
        }
    }

    struct Tick;

    impl Notification for Tick {
        fn notification_type(&self) -> &'static str {
            "Tick"
        }
    }

    struct Listener;

    #[async_trait]
    impl NotificationHandler<Tick> for Listener {
        fn name(&self) -> &'static str {
            "Listener"
        }

        async fn handle(
            &self,
            _notification: &Tick,
            _mediator: &Mediator,
            _ctx: &RequestContext,
        ) -> std::result::Result<(), BoxError> {
            Ok(())
        }
    }

    #[test]
    fn empty_registry_has_no_handlers() {
        let registry = HandlerRegistry::builder().build();
        assert_eq!(registry.request_handler_count::<Ping>(), 0);
        assert_eq!(registry.notification_handler_count::<Tick>(), 0);
        assert!(registry.notification_handlers::<Tick>().is_empty());
    }

    #[test]
    fn counts_registrations_per_type() {
        let registry = HandlerRegistry::builder()
            .request::<Ping, _>(Pong)
            .notification::<Tick, _>(Listener)
            .notification::<Tick, _>(Listener)
            .build();

        assert_eq!(registry.request_handler_count::<Ping>(), 1);
        assert_eq!(registry.notification_handler_count::<Tick>(), 2);
        assert_eq!(registry.notification_handlers::<Tick>().len(), 2);
    }

    #[test]
    fn missing_request_handler_is_reported() {
        let registry = HandlerRegistry::builder().build();
        let err = registry.request_handler::<Ping>().err().unwrap();
        assert!(matches!(err, MediatorError::NoHandler { .. }));
        assert!(err.to_string().contains("Ping"));
    }

    #[test]
    fn duplicate_request_handlers_are_accepted_at_build_time() {
        let registry = HandlerRegistry::builder()
            .request::<Ping, _>(Pong)
            .request::<Ping, _>(Pong)
            .build();

        assert_eq!(registry.request_handler_count::<Ping>(), 2);
        let err = registry.request_handler::<Ping>().err().unwrap();
        assert_eq!(
            err,
            MediatorError::MultipleHandlers {
                request_type: type_name::<Ping>(),
                count: 2
            }
        );
    }
}
