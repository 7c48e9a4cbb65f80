use std::sync::Arc;

use async_trait::async_trait;
use common::RequestContext;
use domain::{ProductSnapshot, ProductSold};
use integrations::{EmailMessage, EmailSender};
use mediator::{BoxError, Mediator, NotificationHandler};

/// Tells the supplier that one of their products was sold.
pub struct ProductSoldEmailHandler {
    email: Arc<dyn EmailSender>,
}

impl ProductSoldEmailHandler {
    pub fn new(email: Arc<dyn EmailSender>) -> Self {
        Self { email }
    }
}

fn sold_body(product: &ProductSnapshot) -> String {
    let sold_date = product
        .sold_date
        .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();

    format!(
        "<html>\n\
         <body>\n\
         <h2>Product Sold Notification</h2>\n\
         <p>A product has been sold successfully.</p>\n\
         <h3>Product Details:</h3>\n\
         <ul>\n\
         <li><strong>ID:</strong> {}</li>\n\
         <li><strong>Description:</strong> {}</li>\n\
         <li><strong>Supplier:</strong> {}</li>\n\
         <li><strong>Category:</strong> {}</li>\n\
         <li><strong>Sold Date:</strong> {}</li>\n\
         </ul>\n\
         </body>\n\
         </html>",
        product.id, product.description, product.supplier.name, product.category.name, sold_date
    )
}

#[async_trait]
impl NotificationHandler<ProductSold> for ProductSoldEmailHandler {
    fn name(&self) -> &'static str {
        "ProductSoldEmailHandler"
    }

    async fn handle(
        &self,
        event: &ProductSold,
        _mediator: &Mediator,
        _ctx: &RequestContext,
    ) -> Result<(), BoxError> {
        let product = &event.product;
        let to = product.supplier.email.as_str();
        let message = EmailMessage::html(
            to,
            format!("Product Sold - {}", product.description),
            sold_body(product),
        );

        self.email.send(message).await?;
        tracing::info!(product_id = %product.id, to, "sale notification sent");
        Ok(())
    }
}
