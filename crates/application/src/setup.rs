//! Handler registration.

use std::sync::Arc;

use domain::{ProductCreated, ProductSold};
use integrations::{
    AuditService, EmailSender, InMemoryAuditService, InMemoryEmailSender,
    InMemoryWarehouseService, WarehouseService,
};
use mediator::Mediator;
use persistence::EntityStore;

use crate::categories::{
    CategoryHandler, CreateCategory, DeleteCategory, GetCategories, GetCategoryById,
};
use crate::events::{
    ProductCreatedAuditHandler, ProductCreatedWarehouseHandler, ProductSoldAuditHandler,
    ProductSoldEmailHandler, ProductSoldWarehouseHandler,
};
use crate::products::{
    CreateProduct, GetProductById, GetProducts, ProductHandler, UpdateProductStatus,
};
use crate::suppliers::{
    CreateSupplier, DeleteSupplier, GetSupplierById, GetSuppliers, SupplierHandler,
};

/// External collaborators used by the event handlers.
#[derive(Clone)]
pub struct Services {
    pub audit: Arc<dyn AuditService>,
    pub warehouse: Arc<dyn WarehouseService>,
    pub email: Arc<dyn EmailSender>,
}

impl Services {
    /// Services backed entirely by in-memory fakes.
    pub fn in_memory() -> Self {
        Self {
            audit: Arc::new(InMemoryAuditService::new()),
            warehouse: Arc::new(InMemoryWarehouseService::new()),
            email: Arc::new(InMemoryEmailSender::new()),
        }
    }
}

/// Builds the mediator with every use case and event handler.
///
/// Event handlers run in the order they are listed here.
pub fn build_mediator(store: Arc<dyn EntityStore>, services: &Services) -> Mediator {
    let categories = CategoryHandler::new(Arc::clone(&store));
    let suppliers = SupplierHandler::new(Arc::clone(&store));
    let products = ProductHandler::new(Arc::clone(&store));

    let registry = Mediator::builder()
        // Categories
        .request::<CreateCategory, _>(categories.clone())
        .request::<DeleteCategory, _>(categories.clone())
        .request::<GetCategories, _>(categories.clone())
        .request::<GetCategoryById, _>(categories)
        // Suppliers
        .request::<CreateSupplier, _>(suppliers.clone())
        .request::<DeleteSupplier, _>(suppliers.clone())
        .request::<GetSuppliers, _>(suppliers.clone())
        .request::<GetSupplierById, _>(suppliers)
        // Products
        .request::<CreateProduct, _>(products.clone())
        .request::<UpdateProductStatus, _>(products.clone())
        .request::<GetProducts, _>(products.clone())
        .request::<GetProductById, _>(products)
        // ProductCreated
        .notification::<ProductCreated, _>(ProductCreatedAuditHandler::new(Arc::clone(
            &services.audit,
        )))
        .notification::<ProductCreated, _>(ProductCreatedWarehouseHandler::new(
            Arc::clone(&services.warehouse),
            Arc::clone(&store),
        ))
        // ProductSold
        .notification::<ProductSold, _>(ProductSoldAuditHandler::new(Arc::clone(
            &services.audit,
        )))
        .notification::<ProductSold, _>(ProductSoldWarehouseHandler::new(Arc::clone(
            &services.warehouse,
        )))
        .notification::<ProductSold, _>(ProductSoldEmailHandler::new(Arc::clone(
            &services.email,
        )))
        .build();

    tracing::debug!("mediator handlers registered");
    Mediator::new(registry)
}
