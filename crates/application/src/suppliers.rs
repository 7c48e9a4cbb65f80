//! Supplier use cases.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{RequestContext, SupplierId};
use domain::{Country, Currency, Email, Entity, Supplier};
use mediator::{Mediator, Request, RequestHandler};
use persistence::{EntityStore, UnitOfWork};
use serde::Serialize;

use crate::{ApplicationError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupplierResponse {
    pub id: SupplierId,
    pub name: String,
    pub email: String,
    pub currency_code: String,
    pub country_code: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Supplier> for SupplierResponse {
    fn from(supplier: &Supplier) -> Self {
        Self {
            id: supplier.id(),
            name: supplier.name().to_string(),
            email: supplier.email().as_str().to_string(),
            currency_code: supplier.currency().code().to_string(),
            country_code: supplier.country().code().to_string(),
            created_at: supplier.created_at(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateSupplier {
    pub name: String,
    pub email: String,
    pub currency_code: String,
    pub country_code: String,
}

impl Request for CreateSupplier {
    type Response = SupplierResponse;
    type Error = ApplicationError;
}

/// Deletes a supplier. Responds `false` when it does not exist.
#[derive(Debug, Clone, Copy)]
pub struct DeleteSupplier {
    pub id: SupplierId,
}

impl Request for DeleteSupplier {
    type Response = bool;
    type Error = ApplicationError;
}

#[derive(Debug, Clone, Copy)]
pub struct GetSuppliers;

impl Request for GetSuppliers {
    type Response = Vec<SupplierResponse>;
    type Error = ApplicationError;
}

#[derive(Debug, Clone, Copy)]
pub struct GetSupplierById {
    pub id: SupplierId,
}

impl Request for GetSupplierById {
    type Response = Option<SupplierResponse>;
    type Error = ApplicationError;
}

#[derive(Clone)]
pub struct SupplierHandler {
    store: Arc<dyn EntityStore>,
}

impl SupplierHandler {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestHandler<CreateSupplier> for SupplierHandler {
    #[tracing::instrument(skip_all, fields(name = %request.name))]
    async fn handle(
        &self,
        request: CreateSupplier,
        mediator: &Mediator,
        ctx: &RequestContext,
    ) -> Result<SupplierResponse> {
        let email = Email::new(request.email)?;
        let currency = Currency::from_code(&request.currency_code)?;
        let country = Country::from_code(&request.country_code)?;
        let supplier = Supplier::new(request.name, email, currency, country)?;

        if self.store.supplier_email_exists(supplier.email().as_str()).await? {
            return Err(ApplicationError::Conflict(format!(
                "Supplier with email '{}' already exists",
                supplier.email()
            )));
        }

        let response = SupplierResponse::from(&supplier);
        let mut uow = UnitOfWork::new(Arc::clone(&self.store), mediator, ctx);
        uow.add(supplier);
        uow.save_changes().await?;

        tracing::info!(supplier_id = %response.id, "supplier created");
        Ok(response)
    }
}

#[async_trait]
impl RequestHandler<DeleteSupplier> for SupplierHandler {
    #[tracing::instrument(skip_all, fields(supplier_id = %request.id))]
    async fn handle(
        &self,
        request: DeleteSupplier,
        mediator: &Mediator,
        ctx: &RequestContext,
    ) -> Result<bool> {
        let Some(supplier) = self.store.get_supplier(request.id).await? else {
            return Ok(false);
        };

        let mut uow = UnitOfWork::new(Arc::clone(&self.store), mediator, ctx);
        uow.remove(supplier);
        uow.save_changes().await?;

        tracing::info!("supplier deleted");
        Ok(true)
    }
}

#[async_trait]
impl RequestHandler<GetSuppliers> for SupplierHandler {
    async fn handle(
        &self,
        _request: GetSuppliers,
        _mediator: &Mediator,
        _ctx: &RequestContext,
    ) -> Result<Vec<SupplierResponse>> {
        let suppliers = self.store.list_suppliers().await?;
        Ok(suppliers.iter().map(SupplierResponse::from).collect())
    }
}

#[async_trait]
impl RequestHandler<GetSupplierById> for SupplierHandler {
    async fn handle(
        &self,
        request: GetSupplierById,
        _mediator: &Mediator,
        _ctx: &RequestContext,
    ) -> Result<Option<SupplierResponse>> {
        let supplier = self.store.get_supplier(request.id).await?;
        Ok(supplier.as_ref().map(SupplierResponse::from))
    }
}
