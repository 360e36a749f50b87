//! Politician directory endpoint.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use service_core::error::AppError;
use service_core::json::Utf8Json;

use crate::handlers::params::{extract, PoliticianParams};
use crate::models::PoliticianPage;
use crate::services::record_error;
use crate::startup::AppState;

/// GET /api/v1/politicos/
pub async fn list_politicians(
    State(state): State<AppState>,
    params: Result<Query<PoliticianParams>, QueryRejection>,
) -> Result<Utf8Json<PoliticianPage>, AppError> {
    directory_page(&state, params)
        .await
        .map(Utf8Json)
        .inspect_err(|e| record_error(e.kind()))
}

async fn directory_page(
    state: &AppState,
    params: Result<Query<PoliticianParams>, QueryRejection>,
) -> Result<PoliticianPage, AppError> {
    let request = extract(params)?.into_query(&state.api)?;
    state.politicians.list(request).await
}
