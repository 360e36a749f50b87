//! Application startup and lifecycle management.

use axum::{http::StatusCode, middleware, response::IntoResponse, routing::get, Router};
use serde_json::json;
use service_core::error::AppError;
use service_core::json::Utf8Json;
use service_core::middleware::request_id_middleware;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{ApiConfig, GastosConfig};
use crate::handlers::{
    aggregate, health_check, list_by_politician, list_politicians, metrics_handler,
    readiness_check,
};
use crate::middleware::metrics_middleware;
use crate::services::{
    init_metrics, AggregationService, Database, ExpenseService, ExpenseStore,
    PoliticianDirectory,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ExpenseStore>,
    pub expenses: ExpenseService,
    pub aggregation: AggregationService,
    pub politicians: PoliticianDirectory,
    pub api: ApiConfig,
    pub service_name: String,
    pub service_version: String,
}

impl AppState {
    /// Wire every query service to the same store.
    pub fn new(
        store: Arc<dyn ExpenseStore>,
        api: ApiConfig,
        service_name: impl Into<String>,
        service_version: impl Into<String>,
    ) -> Self {
        Self {
            expenses: ExpenseService::new(store.clone()),
            aggregation: AggregationService::new(store.clone()),
            politicians: PoliticianDirectory::new(store.clone()),
            store,
            api,
            service_name: service_name.into(),
            service_version: service_version.into(),
        }
    }
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Utf8Json(json!({ "error": "not found" })),
    )
}

/// Full HTTP surface: API routes, operational endpoints and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/gastos/politico/:id", get(list_by_politician))
        .route("/api/v1/gastos/aggregate", get(aggregate))
        .route("/api/v1/politicos/", get(list_politicians))
        .route("/api/v1/politicos", get(list_politicians))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    db: Database,
    state: AppState,
}

impl Application {
    /// Connect the pool and bind the listener.
    pub async fn build(config: GastosConfig) -> Result<Self, AppError> {
        init_metrics();

        let db = Database::new(&config.database).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            e
        })?;

        let state = AppState::new(
            Arc::new(db.clone()),
            config.api,
            config.service_name.clone(),
            config.service_version.clone(),
        );

        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Gastos service listener bound");

        Ok(Self {
            port,
            listener,
            db,
            state,
        })
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests and
    /// close the pool.
    pub async fn run_until_stopped<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = build_router(self.state);

        tracing::info!(
            service = "gastos-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        let served = axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown)
            .await;

        self.db.close().await;

        served.map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            std::io::Error::other(format!("HTTP server error: {}", e))
        })
    }
}
