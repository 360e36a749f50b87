//! Common test utilities for gastos-service router tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use gastos_service::config::ApiConfig;
use gastos_service::models::Row;
use gastos_service::query::{BoundParam, QueryParam, SqlQuery};
use gastos_service::services::ExpenseStore;
use gastos_service::{build_router, AppState};
use http_body_util::BodyExt;
use service_core::error::AppError;
use std::sync::{Arc, Mutex, Once};
use tower::util::ServiceExt;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,gastos_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A query the store was asked to run: its SQL text and named binds.
#[derive(Debug, Clone)]
pub struct RecordedQuery {
    pub operation: &'static str,
    sql: String,
    params: Vec<BoundParam>,
}

impl RecordedQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[BoundParam] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&QueryParam> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }
}

/// In-memory store: answers every query with scripted rows and count and
/// records what it was asked.
#[derive(Default)]
pub struct FakeStore {
    rows: Vec<Row>,
    count: i64,
    failing: bool,
    calls: Mutex<Vec<RecordedQuery>>,
}

impl FakeStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            count: rows.len() as i64,
            rows,
            ..Self::default()
        }
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedQuery> {
        self.calls.lock().unwrap().clone()
    }

    /// The last query recorded under `operation`.
    pub fn query(&self, operation: &str) -> RecordedQuery {
        self.calls()
            .into_iter()
            .rev()
            .find(|c| c.operation == operation)
            .unwrap_or_else(|| panic!("no query recorded for {}", operation))
    }

    fn record(&self, operation: &'static str, query: &SqlQuery) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(RecordedQuery {
            operation,
            sql: query.sql().to_string(),
            params: query.params().to_vec(),
        });
        if self.failing {
            return Err(AppError::StorageUnavailable(anyhow::anyhow!(
                "connection refused"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ExpenseStore for FakeStore {
    async fn fetch_rows(
        &self,
        operation: &'static str,
        query: SqlQuery,
    ) -> Result<Vec<Row>, AppError> {
        self.record(operation, &query)?;
        Ok(self.rows.clone())
    }

    async fn fetch_count(&self, operation: &'static str, query: SqlQuery) -> Result<i64, AppError> {
        self.record(operation, &query)?;
        Ok(self.count)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        if self.failing {
            return Err(AppError::StorageUnavailable(anyhow::anyhow!(
                "connection refused"
            )));
        }
        Ok(())
    }
}

/// Router over the given store with default pagination bounds.
pub fn app(store: Arc<FakeStore>) -> Router {
    init_tracing();
    build_router(AppState::new(
        store,
        ApiConfig::default(),
        "gastos-service",
        "test",
    ))
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn get_with_header(app: Router, uri: &str, name: &str, value: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .header(name, value)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn assert_json_utf8(response: &Response) {
    assert_eq!(
        response.headers()[axum::http::header::CONTENT_TYPE],
        "application/json; charset=utf-8"
    );
}
