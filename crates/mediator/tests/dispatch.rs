//! Dispatch behaviour across requests and notifications.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::{Actor, RequestContext};
use mediator::{
    BoxError, Mediator, MediatorError, Notification, NotificationHandler, Request, RequestHandler,
};

type Log = Arc<Mutex<Vec<String>>>;

#[derive(Debug)]
enum AppError {
    Config(MediatorError),
}

impl From<MediatorError> for AppError {
    fn from(e: MediatorError) -> Self {
        AppError::Config(e)
    }
}

struct PlaceOrder {
    sku: String,
}

impl Request for PlaceOrder {
    type Response = usize;
    type Error = AppError;
}

struct OrderPlaced {
    sku: String,
}

impl Notification for OrderPlaced {
    fn notification_type(&self) -> &'static str {
        "OrderPlaced"
    }
}

struct PlaceOrderHandler {
    log: Log,
}

#[async_trait]
impl RequestHandler<PlaceOrder> for PlaceOrderHandler {
    async fn handle(
        &self,
        request: PlaceOrder,
        mediator: &Mediator,
        ctx: &RequestContext,
    ) -> Result<usize, AppError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("handler:{}", request.sku));
        let outcome = mediator
            .publish(OrderPlaced { sku: request.sku }, ctx)
            .await;
        Ok(outcome.handlers_invoked)
    }
}

enum Behaviour {
    Succeed,
    Fail,
    Panic,
}

struct Step {
    name: &'static str,
    behaviour: Behaviour,
    log: Log,
}

#[async_trait]
impl NotificationHandler<OrderPlaced> for Step {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn handle(
        &self,
        notification: &OrderPlaced,
        _mediator: &Mediator,
        ctx: &RequestContext,
    ) -> Result<(), BoxError> {
        self.log.lock().unwrap().push(format!(
            "{}:{}:{}",
            self.name,
            notification.sku,
            ctx.actor().id
        ));
        match self.behaviour {
            Behaviour::Succeed => Ok(()),
            Behaviour::Fail => Err("warehouse unavailable".into()),
            Behaviour::Panic => panic!("handler blew up"),
        }
    }
}

fn step(name: &'static str, behaviour: Behaviour, log: &Log) -> Step {
    Step {
        name,
        behaviour,
        log: Arc::clone(log),
    }
}

#[tokio::test]
async fn failing_handler_does_not_stop_siblings() {
    let log: Log = Arc::default();
    let mediator = Mediator::new(
        Mediator::builder()
            .notification::<OrderPlaced, _>(step("audit", Behaviour::Succeed, &log))
            .notification::<OrderPlaced, _>(step("warehouse", Behaviour::Fail, &log))
            .notification::<OrderPlaced, _>(step("email", Behaviour::Succeed, &log))
            .build(),
    );

    let outcome = mediator
        .publish(
            OrderPlaced {
                sku: "W-1".to_string(),
            },
            &RequestContext::system(),
        )
        .await;

    assert_eq!(outcome.handlers_invoked, 3);
    assert_eq!(outcome.handlers_failed, 1);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["audit:W-1:system", "warehouse:W-1:system", "email:W-1:system"]
    );
}

#[tokio::test]
async fn panicking_handler_is_isolated() {
    let log: Log = Arc::default();
    let mediator = Mediator::new(
        Mediator::builder()
            .notification::<OrderPlaced, _>(step("first", Behaviour::Panic, &log))
            .notification::<OrderPlaced, _>(step("second", Behaviour::Succeed, &log))
            .build(),
    );

    let outcome = mediator
        .publish(
            OrderPlaced {
                sku: "W-2".to_string(),
            },
            &RequestContext::system(),
        )
        .await;

    assert_eq!(outcome.handlers_invoked, 2);
    assert_eq!(outcome.handlers_failed, 1);
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn every_handler_fails_and_publish_still_returns() {
    let log: Log = Arc::default();
    let mediator = Mediator::new(
        Mediator::builder()
            .notification::<OrderPlaced, _>(step("a", Behaviour::Fail, &log))
            .notification::<OrderPlaced, _>(step("b", Behaviour::Fail, &log))
            .build(),
    );

    let outcome = mediator
        .publish(
            OrderPlaced {
                sku: "W-3".to_string(),
            },
            &RequestContext::system(),
        )
        .await;

    assert_eq!(outcome.handlers_failed, 2);
    assert!(!outcome.is_clean());
}

#[tokio::test]
async fn request_handler_can_publish_through_the_same_mediator() {
    let log: Log = Arc::default();
    let mediator = Mediator::new(
        Mediator::builder()
            .request::<PlaceOrder, _>(PlaceOrderHandler {
                log: Arc::clone(&log),
            })
            .notification::<OrderPlaced, _>(step("audit", Behaviour::Succeed, &log))
            .build(),
    );
    let ctx = RequestContext::new(Actor::new("clerk-7", "Clerk"));

    let invoked = mediator
        .send(
            PlaceOrder {
                sku: "W-4".to_string(),
            },
            &ctx,
        )
        .await
        .unwrap();

    assert_eq!(invoked, 1);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["handler:W-4", "audit:W-4:clerk-7"]
    );
}

#[tokio::test]
async fn ambiguous_request_fails_before_any_handler_runs() {
    let log: Log = Arc::default();
    let mediator = Mediator::new(
        Mediator::builder()
            .request::<PlaceOrder, _>(PlaceOrderHandler {
                log: Arc::clone(&log),
            })
            .request::<PlaceOrder, _>(PlaceOrderHandler {
                log: Arc::clone(&log),
            })
            .build(),
    );

    let result = mediator
        .send(
            PlaceOrder {
                sku: "W-5".to_string(),
            },
            &RequestContext::system(),
        )
        .await;

    match result {
        Err(AppError::Config(MediatorError::MultipleHandlers { count, .. })) => {
            assert_eq!(count, 2)
        }
        other => panic!("expected MultipleHandlers, got {other:?}"),
    }
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unregistered_request_fails_with_no_handler() {
    let mediator = Mediator::new(Mediator::builder().build());

    let result = mediator
        .send(
            PlaceOrder {
                sku: "W-6".to_string(),
            },
            &RequestContext::system(),
        )
        .await;

    assert!(matches!(
        result,
        Err(AppError::Config(MediatorError::NoHandler { .. }))
    ));
}
