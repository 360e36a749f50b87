//! Storage seam consumed by the query services.

use async_trait::async_trait;
use service_core::error::AppError;

use crate::models::Row;
use crate::query::SqlQuery;

/// Read-only access to the expense table.
///
/// `operation` names the call site; implementations use it for logs and
/// metrics only.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Execute a parameterized query and return its rows in projection order.
    async fn fetch_rows(&self, operation: &'static str, query: SqlQuery)
        -> Result<Vec<Row>, AppError>;

    /// Execute a `COUNT(*)` query and return the scalar.
    async fn fetch_count(&self, operation: &'static str, query: SqlQuery) -> Result<i64, AppError>;

    /// Cheap connectivity check for health endpoints.
    async fn health_check(&self) -> Result<(), AppError>;
}
