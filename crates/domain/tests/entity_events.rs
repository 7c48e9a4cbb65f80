//! Integration tests for entity event queues and event routing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::RequestContext;
use domain::{
    Category, Country, Currency, DomainEvent, Email, Entity, EventMetadata, Price, Product,
    ProductCreated, ProductSold, Supplier,
};
use mediator::{BoxError, Mediator, NotificationHandler};

fn supplier() -> Supplier {
    Supplier::new(
        "Acme",
        Email::new("sales@acme.test").unwrap(),
        Currency::from_code("USD").unwrap(),
        Country::from_code("US").unwrap(),
    )
    .unwrap()
}

fn widget() -> Product {
    let supplier = supplier();
    let category = Category::new("Tools", "TOOL", None).unwrap();
    Product::new(
        "Widget",
        Price::new(500, Currency::usd()).unwrap(),
        Price::new(500, Currency::usd()).unwrap(),
        &supplier,
        &category,
    )
    .unwrap()
}

fn extra_event(product: &Product) -> DomainEvent {
    ProductCreated {
        metadata: EventMetadata::new(),
        product: product.snapshot(),
    }
    .into()
}

mod event_queue {
    use super::*;

    #[test]
    fn add_event_appends_at_the_end() {
        let mut product = widget();
        let before = product.events().len();
        let event = extra_event(&product);

        product.add_event(event.clone());

        let events = product.events();
        assert_eq!(events.len(), before + 1);
        assert_eq!(events.last(), Some(&event));
    }

    #[test]
    fn clear_events_always_leaves_an_empty_queue() {
        let mut product = widget();
        product.add_event(extra_event(&product));

        product.clear_events();
        assert!(product.events().is_empty());

        product.clear_events();
        assert!(product.events().is_empty());
    }

    #[test]
    fn snapshot_is_isolated_from_later_changes() {
        let mut product = widget();
        let snapshot = product.events();
        assert_eq!(snapshot.len(), 1);

        product.add_event(extra_event(&product));
        product.clear_events();

        assert_eq!(snapshot.len(), 1);
        assert!(matches!(snapshot[0], DomainEvent::ProductCreated(_)));
    }

    #[test]
    fn remove_event_removes_first_match_only() {
        let mut product = widget();
        product.clear_events();
        let a = extra_event(&product);
        let b = extra_event(&product);
        product.add_event(a.clone());
        product.add_event(b.clone());
        product.add_event(a.clone());

        assert!(product.remove_event(&a));

        assert_eq!(product.events(), vec![b, a]);
    }

    #[test]
    fn remove_absent_event_is_a_no_op() {
        let mut product = widget();
        let before = product.events();

        assert!(!product.remove_event(&extra_event(&product)));
        assert_eq!(product.events(), before);
    }

    #[test]
    fn events_preserve_causal_order() {
        let mut product = widget();
        product.sell().unwrap();

        let types: Vec<_> = product.events().iter().map(|e| e.event_type()).collect();
        assert_eq!(types, vec!["ProductCreated", "ProductSold"]);
    }

    #[test]
    fn each_event_gets_its_own_idempotency_key() {
        let mut product = widget();
        product.sell().unwrap();

        let events = product.events();
        assert_ne!(
            events[0].metadata().idempotency_key(),
            events[1].metadata().idempotency_key()
        );
        assert!(events[0].metadata().occurred_at() <= events[1].metadata().occurred_at());
    }
}

mod routing {
    use super::*;

    type Seen = Arc<Mutex<Vec<&'static str>>>;

    struct OnCreated(Seen);
    struct OnSold(Seen);

    #[async_trait]
    impl NotificationHandler<ProductCreated> for OnCreated {
        fn name(&self) -> &'static str {
            "OnCreated"
        }

        async fn handle(
            &self,
            _event: &ProductCreated,
            _mediator: &Mediator,
            _ctx: &RequestContext,
        ) -> Result<(), BoxError> {
            self.0.lock().unwrap().push("created");
            Ok(())
        }
    }

    #[async_trait]
    impl NotificationHandler<ProductSold> for OnSold {
        fn name(&self) -> &'static str {
            "OnSold"
        }

        async fn handle(
            &self,
            _event: &ProductSold,
            _mediator: &Mediator,
            _ctx: &RequestContext,
        ) -> Result<(), BoxError> {
            self.0.lock().unwrap().push("sold");
            Ok(())
        }
    }

    #[tokio::test]
    async fn publish_resolves_handlers_by_concrete_event_type() {
        let seen: Seen = Arc::default();
        let mediator = Mediator::new(
            Mediator::builder()
                .notification::<ProductCreated, _>(OnCreated(Arc::clone(&seen)))
                .notification::<ProductSold, _>(OnSold(Arc::clone(&seen)))
                .build(),
        );
        let ctx = RequestContext::system();

        let mut product = widget();
        product.sell().unwrap();

        for event in product.events() {
            let outcome = event.publish(&mediator, &ctx).await;
            assert_eq!(outcome.handlers_invoked, 1);
        }

        assert_eq!(*seen.lock().unwrap(), vec!["created", "sold"]);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let product = widget();
        let json = serde_json::to_value(&product.events()[0]).unwrap();

        assert_eq!(json["type"], "ProductCreated");
        assert_eq!(json["data"]["product"]["description"], "Widget");
        assert_eq!(json["data"]["product"]["status"], "Created");
    }
}
