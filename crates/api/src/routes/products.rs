//! Product endpoints.

use std::sync::Arc;

use application::{
    CreateProduct, GetProductById, GetProducts, ProductResponse, UpdateProductStatus,
};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{CategoryId, ProductId, SupplierId};
use serde::Deserialize;

use super::context::Caller;
use super::{AppState, parse_id};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub description: String,
    pub supplier_id: SupplierId,
    pub category_id: CategoryId,
    pub acquisition_cost_cents: i64,
    pub acquisition_cost_usd_cents: i64,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// POST /api/products
#[tracing::instrument(skip(state, ctx, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let command = CreateProduct {
        description: req.description,
        supplier_id: req.supplier_id,
        category_id: req.category_id,
        acquisition_cost_cents: req.acquisition_cost_cents,
        acquisition_cost_usd_cents: req.acquisition_cost_usd_cents,
    };
    let product = state.mediator.send(command, &ctx).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /api/products
#[tracing::instrument(skip(state, ctx))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    Ok(Json(state.mediator.send(GetProducts, &ctx).await?))
}

/// GET /api/products/{id}
#[tracing::instrument(skip(state, ctx))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id: ProductId = parse_id(&id)?;
    state
        .mediator
        .send(GetProductById { id: product_id }, &ctx)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))
}

/// PATCH /api/products/{id}/status
#[tracing::instrument(skip(state, ctx, req))]
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let command = UpdateProductStatus {
        id: parse_id(&id)?,
        status: req.status,
    };
    Ok(Json(state.mediator.send(command, &ctx).await?))
}
