//! HTTP client tests against a local stand-in server.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};
use chrono::Utc;
use integrations::{
    AuditLogRequest, AuditService, HttpAuditService, HttpWarehouseService, IntegrationError,
    WarehouseService, WmsProductRequest, build_client,
};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Received(Arc<Mutex<Vec<(String, Value)>>>);

impl Received {
    fn push(&self, path: String, body: Value) {
        self.0.lock().unwrap().push((path, body));
    }

    fn all(&self) -> Vec<(String, Value)> {
        self.0.lock().unwrap().clone()
    }
}

async fn create_product(State(received): State<Received>, Json(body): Json<Value>) -> Json<Value> {
    received.push("/products".into(), body);
    Json(json!({ "wmsProductId": "WMS-7777" }))
}

async fn dispatch_product(
    State(received): State<Received>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    received.push(format!("/products/{id}/dispatch"), Value::Null);
    if id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "unknown product" })));
    }
    (StatusCode::OK, Json(json!({ "message": format!("{id} on its way") })))
}

async fn log_action(State(received): State<Received>, Json(body): Json<Value>) -> Json<Value> {
    received.push("/logs".into(), body);
    Json(json!({ "message": "logged" }))
}

/// Starts a server on an ephemeral port and returns its base URL.
async fn spawn_server(received: Received) -> String {
    let app = Router::new()
        .route("/products", post(create_product))
        .route("/products/{id}/dispatch", post(dispatch_product))
        .route("/logs", post(log_action))
        .with_state(received);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client() -> reqwest::Client {
    build_client(Duration::from_secs(5)).unwrap()
}

mod warehouse {
    use super::*;

    #[tokio::test]
    async fn create_product_posts_camel_case_json() {
        let received = Received::default();
        let wms = HttpWarehouseService::new(client(), spawn_server(received.clone()).await);

        let response = wms
            .create_product(WmsProductRequest {
                product_id: "p-1".into(),
                description: "Widget".into(),
                category_shortcode: Some("TOOL".into()),
                supplier_id: Some("s-1".into()),
            })
            .await
            .unwrap();

        assert_eq!(response.wms_product_id, "WMS-7777");
        let calls = received.all();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/products");
        assert_eq!(calls[0].1["productId"], "p-1");
        assert_eq!(calls[0].1["categoryShortcode"], "TOOL");
    }

    #[tokio::test]
    async fn dispatch_hits_product_path() {
        let received = Received::default();
        let base = spawn_server(received.clone()).await;
        let wms = HttpWarehouseService::new(client(), format!("{base}/"));

        let response = wms.dispatch_product("WMS-7777").await.unwrap();

        assert_eq!(response.message, "WMS-7777 on its way");
        assert_eq!(received.all()[0].0, "/products/WMS-7777/dispatch");
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let wms = HttpWarehouseService::new(client(), spawn_server(Received::default()).await);

        let err = wms.dispatch_product("missing").await.unwrap_err();

        match err {
            IntegrationError::Status {
                service,
                status,
                body,
            } => {
                assert_eq!(service, "wms");
                assert_eq!(status, 404);
                assert!(body.contains("unknown product"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unreachable_service_is_an_http_error() {
        let wms = HttpWarehouseService::new(client(), "http://127.0.0.1:9");

        let err = wms.dispatch_product("WMS-1").await.unwrap_err();
        assert!(matches!(err, IntegrationError::Http(_)));
    }
}

mod audit {
    use super::*;

    #[tokio::test]
    async fn log_action_posts_entry() {
        let received = Received::default();
        let audit = HttpAuditService::new(client(), spawn_server(received.clone()).await);

        let response = audit
            .log_action(AuditLogRequest {
                user_id: "user-1".into(),
                email: "sales@acme.test".into(),
                action_name: "Product Sold: Widget".into(),
                timestamp: Utc::now(),
            })
            .await
            .unwrap();

        assert_eq!(response.message, "logged");
        let calls = received.all();
        assert_eq!(calls[0].0, "/logs");
        assert_eq!(calls[0].1["userId"], "user-1");
        assert_eq!(calls[0].1["actionName"], "Product Sold: Widget");
    }
}
