//! HTTP API server for the inventory system.
//!
//! Every endpoint turns its input into a use-case request and sends it
//! through the [`mediator::Mediator`]. Side effects of domain events (WMS
//! registration, audit log, sale emails) run when the use case saves.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use application::{Services, build_mediator};
use axum::Router;
use axum::routing::{get, patch, post};
use integrations::{HttpAuditService, HttpWarehouseService, SmtpEmailSender, build_client};
use metrics_exporter_prometheus::PrometheusHandle;
use persistence::{EntityStore, InMemoryEntityStore, PostgresEntityStore};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use error::StartupError;
use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/api/products",
            post(routes::products::create).get(routes::products::list),
        )
        .route("/api/products/{id}", get(routes::products::get))
        .route(
            "/api/products/{id}/status",
            patch(routes::products::update_status),
        )
        .route(
            "/api/categories",
            post(routes::categories::create).get(routes::categories::list),
        )
        .route(
            "/api/categories/{id}",
            get(routes::categories::get).delete(routes::categories::delete),
        )
        .route(
            "/api/suppliers",
            post(routes::suppliers::create).get(routes::suppliers::list),
        )
        .route(
            "/api/suppliers/{id}",
            get(routes::suppliers::get).delete(routes::suppliers::delete),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the mediator over the given store and collaborators.
pub fn create_state(store: Arc<dyn EntityStore>, services: &Services) -> Arc<AppState> {
    Arc::new(AppState {
        mediator: build_mediator(store, services),
    })
}

/// Application state over an in-memory store and in-memory collaborators.
pub fn create_default_state() -> Arc<AppState> {
    create_state(Arc::new(InMemoryEntityStore::new()), &Services::in_memory())
}

/// Opens the configured entity store.
///
/// With a `DATABASE_URL` this connects to Postgres and applies pending
/// migrations; otherwise the store lives in memory.
pub async fn connect_store(config: &Config) -> Result<Arc<dyn EntityStore>, StartupError> {
    let Some(url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set, using in-memory store");
        return Ok(Arc::new(InMemoryEntityStore::new()));
    };

    let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
    let store = PostgresEntityStore::new(pool);
    store.run_migrations().await?;
    tracing::info!("connected to Postgres, migrations applied");
    Ok(Arc::new(store))
}

/// Builds the outbound collaborators, falling back to in-memory fakes for
/// any that are not configured.
pub fn build_services(config: &Config) -> Result<Services, StartupError> {
    let mut services = Services::in_memory();

    if config.wms_base_url.is_some() || config.audit_base_url.is_some() {
        let client = build_client(config.http_timeout)?;
        if let Some(base_url) = &config.wms_base_url {
            tracing::info!(%base_url, "using HTTP warehouse service");
            services.warehouse = Arc::new(HttpWarehouseService::new(client.clone(), base_url));
        }
        if let Some(base_url) = &config.audit_base_url {
            tracing::info!(%base_url, "using HTTP audit service");
            services.audit = Arc::new(HttpAuditService::new(client, base_url));
        }
    }

    if let Some(smtp) = &config.smtp {
        tracing::info!(host = %smtp.host, port = smtp.port, "using SMTP email sender");
        services.email = Arc::new(SmtpEmailSender::new(smtp)?);
    }

    Ok(services)
}
