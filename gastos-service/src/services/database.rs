//! PostgreSQL-backed expense store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Row as _, TypeInfo};
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::config::DatabaseConfig;
use crate::models::{Row, SqlValue};
use crate::query::SqlQuery;
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::ExpenseStore;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(config), fields(service = "gastos-service"))]
    pub async fn new(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(600))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::StorageUnavailable(anyhow::anyhow!("Failed to connect: {}", e))
            })?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Close every pooled connection; pending acquires fail afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL connection pool closed");
    }
}

/// Decode a row column by column, choosing the Rust type from the
/// Postgres type name. Unlisted types are read as text.
fn decode_row(row: &PgRow) -> Result<Row, sqlx::Error> {
    let mut decoded = Row::with_capacity(row.columns().len());
    for column in row.columns() {
        let idx = column.ordinal();
        let value = match column.type_info().name() {
            "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(SqlValue::Bool),
            "INT2" => row
                .try_get::<Option<i16>, _>(idx)?
                .map(|v| SqlValue::Int(i64::from(v))),
            "INT4" => row
                .try_get::<Option<i32>, _>(idx)?
                .map(|v| SqlValue::Int(i64::from(v))),
            "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(SqlValue::Int),
            "FLOAT4" => row
                .try_get::<Option<f32>, _>(idx)?
                .map(|v| SqlValue::Float(f64::from(v))),
            "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.map(SqlValue::Float),
            "NUMERIC" => row.try_get::<Option<Decimal>, _>(idx)?.map(SqlValue::Decimal),
            "DATE" => row.try_get::<Option<NaiveDate>, _>(idx)?.map(SqlValue::Date),
            "TIMESTAMP" => row
                .try_get::<Option<NaiveDateTime>, _>(idx)?
                .map(SqlValue::Timestamp),
            "TIMESTAMPTZ" => row
                .try_get::<Option<DateTime<Utc>>, _>(idx)?
                .map(SqlValue::TimestampTz),
            _ => row.try_get::<Option<String>, _>(idx)?.map(SqlValue::Text),
        };
        decoded.insert(column.name(), value.unwrap_or(SqlValue::Null));
    }
    Ok(decoded)
}

fn storage_error(operation: &str, err: sqlx::Error) -> AppError {
    AppError::StorageUnavailable(anyhow::anyhow!("{} failed: {}", operation, err))
}

#[async_trait]
impl ExpenseStore for Database {
    #[instrument(skip(self, query), fields(params = query.params().len()))]
    async fn fetch_rows(
        &self,
        operation: &'static str,
        mut query: SqlQuery,
    ) -> Result<Vec<Row>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&[operation])
            .start_timer();

        debug!(sql = %query.sql(), params = ?query.params(), "Executing query");

        let rows = query
            .builder_mut()
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error(operation, e))?;

        let decoded = rows
            .iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| storage_error(operation, e))?;

        timer.observe_duration();
        debug!(rows = decoded.len(), "Query returned");

        Ok(decoded)
    }

    #[instrument(skip(self, query), fields(params = query.params().len()))]
    async fn fetch_count(
        &self,
        operation: &'static str,
        mut query: SqlQuery,
    ) -> Result<i64, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&[operation])
            .start_timer();

        debug!(sql = %query.sql(), params = ?query.params(), "Executing count");

        let total = query
            .builder_mut()
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error(operation, e))?;

        timer.observe_duration();

        Ok(total)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["health_check"])
            .start_timer();

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("health_check", e))?;

        timer.observe_duration();
        Ok(())
    }
}
