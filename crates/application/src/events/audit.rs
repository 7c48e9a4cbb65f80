use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::RequestContext;
use domain::{ProductCreated, ProductSnapshot, ProductSold};
use integrations::{AuditLogRequest, AuditService};
use mediator::{BoxError, Mediator, NotificationHandler};

fn entry(ctx: &RequestContext, product: &ProductSnapshot, action: &str) -> AuditLogRequest {
    AuditLogRequest {
        user_id: ctx.actor().id.clone(),
        email: product.supplier.email.as_str().to_string(),
        action_name: format!("{action}: {}", product.description),
        timestamp: Utc::now(),
    }
}

/// Audits product creation.
pub struct ProductCreatedAuditHandler {
    audit: Arc<dyn AuditService>,
}

impl ProductCreatedAuditHandler {
    pub fn new(audit: Arc<dyn AuditService>) -> Self {
        Self { audit }
    }
}

#[async_trait]
impl NotificationHandler<ProductCreated> for ProductCreatedAuditHandler {
    fn name(&self) -> &'static str {
        "ProductCreatedAuditHandler"
    }

    async fn handle(
        &self,
        event: &ProductCreated,
        _mediator: &Mediator,
        ctx: &RequestContext,
    ) -> Result<(), BoxError> {
        self.audit
            .log_action(entry(ctx, &event.product, "Product Created"))
            .await?;
        tracing::info!(product_id = %event.product.id, "product creation audited");
        Ok(())
    }
}

/// Audits product sales.
pub struct ProductSoldAuditHandler {
    audit: Arc<dyn AuditService>,
}

impl ProductSoldAuditHandler {
    pub fn new(audit: Arc<dyn AuditService>) -> Self {
        Self { audit }
    }
}

#[async_trait]
impl NotificationHandler<ProductSold> for ProductSoldAuditHandler {
    fn name(&self) -> &'static str {
        "ProductSoldAuditHandler"
    }

    async fn handle(
        &self,
        event: &ProductSold,
        _mediator: &Mediator,
        ctx: &RequestContext,
    ) -> Result<(), BoxError> {
        self.audit
            .log_action(entry(ctx, &event.product, "Product Sold"))
            .await?;
        tracing::info!(product_id = %event.product.id, "product sale audited");
        Ok(())
    }
}
