//! Warehouse management system (WMS) service.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::http::{endpoint, read_json, record_call};
use crate::{IntegrationError, Result};

/// Product registration sent to the WMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WmsProductRequest {
    pub product_id: String,
    pub description: String,
    pub category_shortcode: Option<String>,
    pub supplier_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WmsProductResponse {
    pub wms_product_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WmsDispatchResponse {
    pub message: String,
}

/// Registers products with the warehouse and dispatches sold ones.
#[async_trait]
pub trait WarehouseService: Send + Sync {
    /// Registers a product and returns the identifier the WMS assigned.
    async fn create_product(&self, product: WmsProductRequest) -> Result<WmsProductResponse>;

    /// Asks the warehouse to ship a previously registered product.
    async fn dispatch_product(&self, wms_product_id: &str) -> Result<WmsDispatchResponse>;
}

/// WMS client for `POST /products` and `POST /products/{id}/dispatch`.
#[derive(Debug, Clone)]
pub struct HttpWarehouseService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpWarehouseService {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl WarehouseService for HttpWarehouseService {
    #[tracing::instrument(skip(self, product), fields(product_id = %product.product_id))]
    async fn create_product(&self, product: WmsProductRequest) -> Result<WmsProductResponse> {
        let result: Result<WmsProductResponse> = async {
            let response = self
                .client
                .post(endpoint(&self.base_url, "/products"))
                .json(&product)
                .send()
                .await?;
            read_json("wms", response).await
        }
        .await;

        record_call("wms", &result);
        result
    }

    #[tracing::instrument(skip(self))]
    async fn dispatch_product(&self, wms_product_id: &str) -> Result<WmsDispatchResponse> {
        let path = format!("/products/{wms_product_id}/dispatch");
        let result: Result<WmsDispatchResponse> = async {
            let response = self
                .client
                .post(endpoint(&self.base_url, &path))
                .send()
                .await?;
            read_json("wms", response).await
        }
        .await;

        record_call("wms", &result);
        result
    }
}

#[derive(Debug, Default)]
struct InMemoryWarehouseState {
    products: HashMap<String, WmsProductRequest>,
    dispatched: Vec<String>,
    next_id: u32,
    fail_on_create: bool,
    fail_on_dispatch: bool,
}

/// In-memory WMS for testing. Assigns `WMS-0001`, `WMS-0002`, ...
#[derive(Debug, Clone, Default)]
pub struct InMemoryWarehouseService {
    state: Arc<RwLock<InMemoryWarehouseState>>,
}

impl InMemoryWarehouseService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_create(&self, fail: bool) {
        self.state.write().await.fail_on_create = fail;
    }

    pub async fn set_fail_on_dispatch(&self, fail: bool) {
        self.state.write().await.fail_on_dispatch = fail;
    }

    pub async fn product_count(&self) -> usize {
        self.state.read().await.products.len()
    }

    /// Returns the registration stored under a WMS id.
    pub async fn product(&self, wms_product_id: &str) -> Option<WmsProductRequest> {
        self.state.read().await.products.get(wms_product_id).cloned()
    }

    /// WMS ids dispatched so far, oldest first.
    pub async fn dispatched(&self) -> Vec<String> {
        self.state.read().await.dispatched.clone()
    }
}

#[async_trait]
impl WarehouseService for InMemoryWarehouseService {
    async fn create_product(&self, product: WmsProductRequest) -> Result<WmsProductResponse> {
        let mut state = self.state.write().await;
        if state.fail_on_create {
            return Err(IntegrationError::Unavailable("warehouse service".to_string()));
        }

        state.next_id += 1;
        let wms_product_id = format!("WMS-{:04}", state.next_id);
        state.products.insert(wms_product_id.clone(), product);
        Ok(WmsProductResponse { wms_product_id })
    }

    async fn dispatch_product(&self, wms_product_id: &str) -> Result<WmsDispatchResponse> {
        let mut state = self.state.write().await;
        if state.fail_on_dispatch {
            return Err(IntegrationError::Unavailable("warehouse service".to_string()));
        }
        if !state.products.contains_key(wms_product_id) {
            return Err(IntegrationError::Status {
                service: "wms",
                status: 404,
                body: format!("Unknown product {wms_product_id}"),
            });
        }

        state.dispatched.push(wms_product_id.to_string());
        Ok(WmsDispatchResponse {
            message: format!("Product {wms_product_id} dispatched"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: &str) -> WmsProductRequest {
        WmsProductRequest {
            product_id: id.into(),
            description: "Widget".into(),
            category_shortcode: Some("TOOL".into()),
            supplier_id: None,
        }
    }

    #[tokio::test]
    async fn sequential_wms_ids() {
        let wms = InMemoryWarehouseService::new();

        let first = wms.create_product(request("a")).await.unwrap();
        let second = wms.create_product(request("b")).await.unwrap();

        assert_eq!(first.wms_product_id, "WMS-0001");
        assert_eq!(second.wms_product_id, "WMS-0002");
        assert_eq!(wms.product("WMS-0002").await.unwrap().product_id, "b");
    }

    #[tokio::test]
    async fn dispatch_requires_known_product() {
        let wms = InMemoryWarehouseService::new();
        let created = wms.create_product(request("a")).await.unwrap();

        let response = wms.dispatch_product(&created.wms_product_id).await.unwrap();
        assert_eq!(response.message, "Product WMS-0001 dispatched");

        let err = wms.dispatch_product("WMS-9999").await.unwrap_err();
        assert!(matches!(err, IntegrationError::Status { status: 404, .. }));
        assert_eq!(wms.dispatched().await, vec!["WMS-0001"]);
    }

    #[tokio::test]
    async fn failure_toggles() {
        let wms = InMemoryWarehouseService::new();
        wms.set_fail_on_create(true).await;
        assert!(wms.create_product(request("a")).await.is_err());
        assert_eq!(wms.product_count().await, 0);

        wms.set_fail_on_create(false).await;
        let created = wms.create_product(request("a")).await.unwrap();
        wms.set_fail_on_dispatch(true).await;
        assert!(wms.dispatch_product(&created.wms_product_id).await.is_err());
        assert!(wms.dispatched().await.is_empty());
    }
}
