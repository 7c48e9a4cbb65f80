use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    Category, Country, Currency, Email, Entity, EventMetadata, Price, Product, ProductCreated,
    Supplier,
};

fn fixture() -> (Supplier, Category) {
    let supplier = Supplier::new(
        "Bench Supplier",
        Email::new("bench@example.com").unwrap(),
        Currency::usd(),
        Country::from_code("US").unwrap(),
    )
    .unwrap();
    let category = Category::new("Bench", "BNCH", None).unwrap();
    (supplier, category)
}

fn bench_create_and_sell(c: &mut Criterion) {
    let (supplier, category) = fixture();

    c.bench_function("domain/create_and_sell", |b| {
        b.iter(|| {
            let mut product = Product::new(
                "Bench Widget",
                Price::new(1000, Currency::usd()).unwrap(),
                Price::new(1000, Currency::usd()).unwrap(),
                &supplier,
                &category,
            )
            .unwrap();
            product.sell().unwrap();
            product
        });
    });
}

fn bench_event_snapshot(c: &mut Criterion) {
    let (supplier, category) = fixture();
    let mut group = c.benchmark_group("domain/events_snapshot");

    for pending in [1usize, 10, 100] {
        let mut product = Product::new(
            "Bench Widget",
            Price::zero(Currency::usd()),
            Price::zero(Currency::usd()),
            &supplier,
            &category,
        )
        .unwrap();
        for _ in 1..pending {
            let event = ProductCreated {
                metadata: EventMetadata::new(),
                product: product.snapshot(),
            };
            product.add_event(event.into());
        }

        group.bench_function(format!("{pending}_pending"), |b| {
            b.iter(|| product.events());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_create_and_sell, bench_event_snapshot);
criterion_main!(benches);
