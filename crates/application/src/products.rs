//! Product use cases.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CategoryId, ProductId, RequestContext, SupplierId};
use domain::{Currency, Entity, Price, Product, ProductStatus};
use mediator::{Mediator, Request, RequestHandler};
use persistence::{EntityStore, EntityStoreExt, UnitOfWork};
use serde::Serialize;

use crate::{ApplicationError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoneyResponse {
    pub amount_cents: i64,
    pub currency: String,
}

impl From<&Price> for MoneyResponse {
    fn from(price: &Price) -> Self {
        Self {
            amount_cents: price.amount_cents(),
            currency: price.currency().code().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductResponse {
    pub id: ProductId,
    pub description: String,
    pub supplier_id: SupplierId,
    pub supplier_name: String,
    pub category_id: CategoryId,
    pub category_name: String,
    pub status: ProductStatus,
    pub acquisition_cost: MoneyResponse,
    pub acquisition_cost_usd: MoneyResponse,
    pub acquire_date: DateTime<Utc>,
    pub sold_date: Option<DateTime<Utc>>,
    pub cancel_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub wms_product_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id(),
            description: product.description().to_string(),
            supplier_id: product.supplier().id,
            supplier_name: product.supplier().name.clone(),
            category_id: product.category().id,
            category_name: product.category().name.clone(),
            status: product.status(),
            acquisition_cost: product.acquisition_cost().into(),
            acquisition_cost_usd: product.acquisition_cost_usd().into(),
            acquire_date: product.acquire_date(),
            sold_date: product.sold_date(),
            cancel_date: product.cancel_date(),
            return_date: product.return_date(),
            wms_product_id: product.wms_product_id().map(str::to_string),
            created_at: product.created_at(),
        }
    }
}

/// Registers a product bought from a supplier.
///
/// The cost is in the supplier's currency; the USD cost is always in USD.
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub description: String,
    pub supplier_id: SupplierId,
    pub category_id: CategoryId,
    pub acquisition_cost_cents: i64,
    pub acquisition_cost_usd_cents: i64,
}

impl Request for CreateProduct {
    type Response = ProductResponse;
    type Error = ApplicationError;
}

/// Moves a product to `Sold`, `Returned` or `Canceled`.
#[derive(Debug, Clone)]
pub struct UpdateProductStatus {
    pub id: ProductId,
    pub status: String,
}

impl Request for UpdateProductStatus {
    type Response = ProductResponse;
    type Error = ApplicationError;
}

#[derive(Debug, Clone, Copy)]
pub struct GetProducts;

impl Request for GetProducts {
    type Response = Vec<ProductResponse>;
    type Error = ApplicationError;
}

#[derive(Debug, Clone, Copy)]
pub struct GetProductById {
    pub id: ProductId,
}

impl Request for GetProductById {
    type Response = Option<ProductResponse>;
    type Error = ApplicationError;
}

#[derive(Clone)]
pub struct ProductHandler {
    store: Arc<dyn EntityStore>,
}

impl ProductHandler {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Reads the product back so the response includes changes made by event handlers.
    async fn reload(&self, product: &Product) -> Result<ProductResponse> {
        Ok(match self.store.get_product(product.id()).await? {
            Some(stored) => ProductResponse::from(&stored),
            None => ProductResponse::from(product),
        })
    }
}

#[async_trait]
impl RequestHandler<CreateProduct> for ProductHandler {
    #[tracing::instrument(
        skip_all,
        fields(supplier_id = %request.supplier_id, category_id = %request.category_id)
    )]
    async fn handle(
        &self,
        request: CreateProduct,
        mediator: &Mediator,
        ctx: &RequestContext,
    ) -> Result<ProductResponse> {
        let supplier = self.store.require_supplier(request.supplier_id).await?;
        let category = self.store.require_category(request.category_id).await?;

        let cost = Price::new(request.acquisition_cost_cents, supplier.currency().clone())?;
        let cost_usd = Price::new(request.acquisition_cost_usd_cents, Currency::usd())?;
        let product = Product::new(request.description, cost, cost_usd, &supplier, &category)?;
        let snapshot = product.clone();

        let mut uow = UnitOfWork::new(Arc::clone(&self.store), mediator, ctx);
        uow.add(product);
        uow.save_changes().await?;

        tracing::info!(product_id = %snapshot.id(), "product created");
        self.reload(&snapshot).await
    }
}

#[async_trait]
impl RequestHandler<UpdateProductStatus> for ProductHandler {
    #[tracing::instrument(skip_all, fields(product_id = %request.id, status = %request.status))]
    async fn handle(
        &self,
        request: UpdateProductStatus,
        mediator: &Mediator,
        ctx: &RequestContext,
    ) -> Result<ProductResponse> {
        let mut uow = UnitOfWork::new(Arc::clone(&self.store), mediator, ctx);
        let product = uow
            .product_mut(request.id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Product", request.id))?;

        match ProductStatus::parse(&request.status) {
            Some(ProductStatus::Sold) => product.sell()?,
            Some(ProductStatus::Returned) => product.mark_returned()?,
            Some(ProductStatus::Canceled) => product.cancel()?,
            _ => {
                return Err(ApplicationError::Validation(format!(
                    "Invalid status '{}'. Expected Sold, Returned or Canceled.",
                    request.status
                )));
            }
        }
        let updated = product.clone();
        uow.save_changes().await?;

        tracing::info!(status = %updated.status(), "product status updated");
        self.reload(&updated).await
    }
}

#[async_trait]
impl RequestHandler<GetProducts> for ProductHandler {
    async fn handle(
        &self,
        _request: GetProducts,
        _mediator: &Mediator,
        _ctx: &RequestContext,
    ) -> Result<Vec<ProductResponse>> {
        let products = self.store.list_products().await?;
        Ok(products.iter().map(ProductResponse::from).collect())
    }
}

#[async_trait]
impl RequestHandler<GetProductById> for ProductHandler {
    async fn handle(
        &self,
        request: GetProductById,
        _mediator: &Mediator,
        _ctx: &RequestContext,
    ) -> Result<Option<ProductResponse>> {
        let product = self.store.get_product(request.id).await?;
        Ok(product.as_ref().map(ProductResponse::from))
    }
}
