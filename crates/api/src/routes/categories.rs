//! Category endpoints.

use std::sync::Arc;

use application::{
    CategoryResponse, CreateCategory, DeleteCategory, GetCategories, GetCategoryById,
};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::CategoryId;
use serde::Deserialize;

use super::context::Caller;
use super::{AppState, parse_id};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub shortcode: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
}

/// POST /api/categories
#[tracing::instrument(skip(state, ctx, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let command = CreateCategory {
        name: req.name,
        shortcode: req.shortcode,
        parent_id: req.parent_id,
    };
    let category = state.mediator.send(command, &ctx).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/categories
#[tracing::instrument(skip(state, ctx))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    Ok(Json(state.mediator.send(GetCategories, &ctx).await?))
}

/// GET /api/categories/{id}
#[tracing::instrument(skip(state, ctx))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category_id: CategoryId = parse_id(&id)?;
    state
        .mediator
        .send(GetCategoryById { id: category_id }, &ctx)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Category {id} not found")))
}

/// DELETE /api/categories/{id}
#[tracing::instrument(skip(state, ctx))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .mediator
        .send(DeleteCategory { id: parse_id(&id)? }, &ctx)
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Category {id} not found")))
    }
}
