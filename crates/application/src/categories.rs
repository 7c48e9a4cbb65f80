//! Category use cases.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CategoryId, RequestContext};
use domain::{Category, Entity};
use mediator::{Mediator, Request, RequestHandler};
use persistence::{EntityStore, UnitOfWork};
use serde::Serialize;

use crate::{ApplicationError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
    pub shortcode: String,
    pub parent_id: Option<CategoryId>,
    pub parent_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CategoryResponse {
    fn new(category: &Category, parent_name: Option<String>) -> Self {
        Self {
            id: category.id(),
            name: category.name().to_string(),
            shortcode: category.shortcode().to_string(),
            parent_id: category.parent_id(),
            parent_name,
            created_at: category.created_at(),
        }
    }
}

/// Creates a category, optionally under an existing parent.
#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub name: String,
    pub shortcode: String,
    pub parent_id: Option<CategoryId>,
}

impl Request for CreateCategory {
    type Response = CategoryResponse;
    type Error = ApplicationError;
}

/// Deletes a category. Responds `false` when it does not exist.
#[derive(Debug, Clone, Copy)]
pub struct DeleteCategory {
    pub id: CategoryId,
}

impl Request for DeleteCategory {
    type Response = bool;
    type Error = ApplicationError;
}

#[derive(Debug, Clone, Copy)]
pub struct GetCategories;

impl Request for GetCategories {
    type Response = Vec<CategoryResponse>;
    type Error = ApplicationError;
}

#[derive(Debug, Clone, Copy)]
pub struct GetCategoryById {
    pub id: CategoryId,
}

impl Request for GetCategoryById {
    type Response = Option<CategoryResponse>;
    type Error = ApplicationError;
}

/// Handles every category request against one store.
#[derive(Clone)]
pub struct CategoryHandler {
    store: Arc<dyn EntityStore>,
}

impl CategoryHandler {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn parent_name(&self, category: &Category) -> Result<Option<String>> {
        match category.parent_id() {
            Some(parent_id) => Ok(self
                .store
                .get_category(parent_id)
                .await?
                .map(|p| p.name().to_string())),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RequestHandler<CreateCategory> for CategoryHandler {
    #[tracing::instrument(skip_all, fields(name = %request.name, shortcode = %request.shortcode))]
    async fn handle(
        &self,
        request: CreateCategory,
        mediator: &Mediator,
        ctx: &RequestContext,
    ) -> Result<CategoryResponse> {
        let parent = match request.parent_id {
            Some(parent_id) => Some(self.store.get_category(parent_id).await?.ok_or_else(|| {
                ApplicationError::Validation(format!("Parent category {parent_id} does not exist."))
            })?),
            None => None,
        };

        let category = Category::new(request.name, request.shortcode, parent.as_ref())?;

        if self.store.category_name_exists(category.name()).await? {
            return Err(ApplicationError::Conflict(format!(
                "Category with name '{}' already exists",
                category.name()
            )));
        }
        if self.store.category_shortcode_exists(category.shortcode()).await? {
            return Err(ApplicationError::Conflict(format!(
                "Category with shortcode '{}' already exists",
                category.shortcode()
            )));
        }

        let response = CategoryResponse::new(&category, parent.map(|p| p.name().to_string()));
        let mut uow = UnitOfWork::new(Arc::clone(&self.store), mediator, ctx);
        uow.add(category);
        uow.save_changes().await?;

        tracing::info!(category_id = %response.id, "category created");
        Ok(response)
    }
}

#[async_trait]
impl RequestHandler<DeleteCategory> for CategoryHandler {
    #[tracing::instrument(skip_all, fields(category_id = %request.id))]
    async fn handle(
        &self,
        request: DeleteCategory,
        mediator: &Mediator,
        ctx: &RequestContext,
    ) -> Result<bool> {
        let Some(category) = self.store.get_category(request.id).await? else {
            return Ok(false);
        };

        let mut uow = UnitOfWork::new(Arc::clone(&self.store), mediator, ctx);
        uow.remove(category);
        uow.save_changes().await?;

        tracing::info!("category deleted");
        Ok(true)
    }
}

#[async_trait]
impl RequestHandler<GetCategories> for CategoryHandler {
    async fn handle(
        &self,
        _request: GetCategories,
        _mediator: &Mediator,
        _ctx: &RequestContext,
    ) -> Result<Vec<CategoryResponse>> {
        let categories = self.store.list_categories().await?;
        let names: HashMap<CategoryId, String> = categories
            .iter()
            .map(|c| (c.id(), c.name().to_string()))
            .collect();

        Ok(categories
            .iter()
            .map(|c| {
                let parent_name = c.parent_id().and_then(|p| names.get(&p).cloned());
                CategoryResponse::new(c, parent_name)
            })
            .collect())
    }
}

#[async_trait]
impl RequestHandler<GetCategoryById> for CategoryHandler {
    async fn handle(
        &self,
        request: GetCategoryById,
        _mediator: &Mediator,
        _ctx: &RequestContext,
    ) -> Result<Option<CategoryResponse>> {
        let Some(category) = self.store.get_category(request.id).await? else {
            return Ok(None);
        };
        let parent_name = self.parent_name(&category).await?;
        Ok(Some(CategoryResponse::new(&category, parent_name)))
    }
}
