//! Supplier endpoints.

use std::sync::Arc;

use application::{
    CreateSupplier, DeleteSupplier, GetSupplierById, GetSuppliers, SupplierResponse,
};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::SupplierId;
use serde::Deserialize;

use super::context::Caller;
use super::{AppState, parse_id};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateSupplierRequest {
    pub name: String,
    pub email: String,
    pub currency_code: String,
    pub country_code: String,
}

/// POST /api/suppliers
#[tracing::instrument(skip(state, ctx, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Json(req): Json<CreateSupplierRequest>,
) -> Result<(StatusCode, Json<SupplierResponse>), ApiError> {
    let command = CreateSupplier {
        name: req.name,
        email: req.email,
        currency_code: req.currency_code,
        country_code: req.country_code,
    };
    let supplier = state.mediator.send(command, &ctx).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

/// GET /api/suppliers
#[tracing::instrument(skip(state, ctx))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
) -> Result<Json<Vec<SupplierResponse>>, ApiError> {
    Ok(Json(state.mediator.send(GetSuppliers, &ctx).await?))
}

/// GET /api/suppliers/{id}
#[tracing::instrument(skip(state, ctx))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> Result<Json<SupplierResponse>, ApiError> {
    let supplier_id: SupplierId = parse_id(&id)?;
    state
        .mediator
        .send(GetSupplierById { id: supplier_id }, &ctx)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Supplier {id} not found")))
}

/// DELETE /api/suppliers/{id}
#[tracing::instrument(skip(state, ctx))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .mediator
        .send(DeleteSupplier { id: parse_id(&id)? }, &ctx)
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Supplier {id} not found")))
    }
}
