//! Expense endpoints under `/api/v1/gastos`.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use service_core::error::AppError;
use service_core::json::Utf8Json;

use crate::handlers::params::{extract, extract_path, AggregateParams, ExpenseParams};
use crate::models::{AggregatePage, ExpensePage};
use crate::services::record_error;
use crate::startup::AppState;

/// GET /api/v1/gastos/politico/:id
pub async fn list_by_politician(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    params: Result<Query<ExpenseParams>, QueryRejection>,
) -> Result<Utf8Json<ExpensePage>, AppError> {
    expense_page(&state, id, params)
        .await
        .map(Utf8Json)
        .inspect_err(|e| record_error(e.kind()))
}

async fn expense_page(
    state: &AppState,
    id: Result<Path<String>, PathRejection>,
    params: Result<Query<ExpenseParams>, QueryRejection>,
) -> Result<ExpensePage, AppError> {
    let id = extract_path(id)?;
    let request = extract(params)?.into_query(&id, &state.api)?;
    state.expenses.list_by_politician(request).await
}

/// GET /api/v1/gastos/aggregate
pub async fn aggregate(
    State(state): State<AppState>,
    params: Result<Query<AggregateParams>, QueryRejection>,
) -> Result<Utf8Json<AggregatePage>, AppError> {
    aggregate_page(&state, params)
        .await
        .map(Utf8Json)
        .inspect_err(|e| record_error(e.kind()))
}

async fn aggregate_page(
    state: &AppState,
    params: Result<Query<AggregateParams>, QueryRejection>,
) -> Result<AggregatePage, AppError> {
    let request = extract(params)?.into_query(&state.api)?;
    state.aggregation.aggregate(request).await
}
