//! Liveness, readiness and metrics endpoints.

use axum::{extract::State, http::header, http::StatusCode, response::IntoResponse};
use serde_json::json;
use service_core::error::AppError;
use service_core::json::Utf8Json;

use crate::services::get_metrics;
use crate::startup::AppState;

/// Liveness endpoint for Docker/K8s.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.health_check().await {
        Ok(()) => {
            tracing::debug!("Health check passed");
            (
                StatusCode::OK,
                Utf8Json(json!({
                    "status": "ok",
                    "service": state.service_name,
                    "version": state.service_version,
                })),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed - database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Utf8Json(json!({
                    "status": "unhealthy",
                    "service": state.service_name,
                    "version": state.service_version,
                })),
            )
        }
    }
}

/// Readiness endpoint for K8s.
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match state.store.health_check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Metrics endpoint for Prometheus scraping.
pub async fn metrics_handler() -> Result<impl IntoResponse, AppError> {
    let metrics = get_metrics()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        metrics,
    ))
}
