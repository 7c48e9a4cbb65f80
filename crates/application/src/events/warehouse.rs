use std::sync::Arc;

use async_trait::async_trait;
use common::RequestContext;
use domain::{ProductCreated, ProductSold};
use integrations::{WarehouseService, WmsProductRequest};
use mediator::{BoxError, Mediator, NotificationHandler};
use persistence::{EntityStore, UnitOfWork};

/// Registers new products with the WMS and stores the identifier it assigns.
pub struct ProductCreatedWarehouseHandler {
    warehouse: Arc<dyn WarehouseService>,
    store: Arc<dyn EntityStore>,
}

impl ProductCreatedWarehouseHandler {
    pub fn new(warehouse: Arc<dyn WarehouseService>, store: Arc<dyn EntityStore>) -> Self {
        Self { warehouse, store }
    }
}

#[async_trait]
impl NotificationHandler<ProductCreated> for ProductCreatedWarehouseHandler {
    fn name(&self) -> &'static str {
        "ProductCreatedWarehouseHandler"
    }

    #[tracing::instrument(skip_all, fields(product_id = %event.product.id))]
    async fn handle(
        &self,
        event: &ProductCreated,
        mediator: &Mediator,
        ctx: &RequestContext,
    ) -> Result<(), BoxError> {
        let product = &event.product;
        let response = self
            .warehouse
            .create_product(WmsProductRequest {
                product_id: product.id.to_string(),
                description: product.description.clone(),
                category_shortcode: Some(product.category.shortcode.clone()),
                supplier_id: Some(product.supplier.id.to_string()),
            })
            .await?;

        let mut uow = UnitOfWork::new(Arc::clone(&self.store), mediator, ctx);
        let Some(stored) = uow.product_mut(product.id).await? else {
            tracing::warn!(
                wms_product_id = %response.wms_product_id,
                "product no longer exists, WMS id not stored"
            );
            return Ok(());
        };
        stored.set_wms_product_id(response.wms_product_id.as_str())?;
        uow.save_changes().await?;

        tracing::info!(wms_product_id = %response.wms_product_id, "product registered in WMS");
        Ok(())
    }
}

/// Asks the WMS to ship sold products.
pub struct ProductSoldWarehouseHandler {
    warehouse: Arc<dyn WarehouseService>,
}

impl ProductSoldWarehouseHandler {
    pub fn new(warehouse: Arc<dyn WarehouseService>) -> Self {
        Self { warehouse }
    }
}

#[async_trait]
impl NotificationHandler<ProductSold> for ProductSoldWarehouseHandler {
    fn name(&self) -> &'static str {
        "ProductSoldWarehouseHandler"
    }

    #[tracing::instrument(skip_all, fields(product_id = %event.product.id))]
    async fn handle(
        &self,
        event: &ProductSold,
        _mediator: &Mediator,
        _ctx: &RequestContext,
    ) -> Result<(), BoxError> {
        let Some(wms_product_id) = event.product.wms_product_id.as_deref() else {
            tracing::warn!("product has no WMS id, dispatch skipped");
            return Ok(());
        };

        let response = self.warehouse.dispatch_product(wms_product_id).await?;
        tracing::info!(wms_product_id, message = %response.message, "product dispatched");
        Ok(())
    }
}
