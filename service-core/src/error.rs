use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::json::Utf8Json;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or out-of-range request input (pagination, years, identifiers).
    #[error("Bad request: {0}")]
    ClientInput(String),

    /// A parameter outside its closed set of accepted values.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl AppError {
    /// Short stable label, used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ClientInput(_) => "client_input",
            AppError::InvalidParameter(_) => "invalid_parameter",
            AppError::StorageUnavailable(_) => "storage_unavailable",
            AppError::InternalError(_) => "internal",
            AppError::ConfigError(_) => "config",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ClientInput(_) | AppError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalError(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        let status = self.status_code();
        let error = match self {
            AppError::ClientInput(msg) | AppError::InvalidParameter(msg) => msg,
            AppError::StorageUnavailable(err) => {
                tracing::error!(error = %err, "Storage unavailable");
                "Storage unavailable".to_string()
            }
            AppError::InternalError(err) => {
                tracing::error!(error = ?err, "Internal server error");
                "Internal server error".to_string()
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = %err, "Configuration error");
                "Configuration error".to_string()
            }
        };

        (status, Utf8Json(ErrorResponse { error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        assert_eq!(
            AppError::ClientInput("page must be an integer".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidParameter("invalid group_by".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn storage_errors_map_to_service_unavailable() {
        let err = AppError::StorageUnavailable(anyhow::anyhow!("pool timed out"));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.kind(), "storage_unavailable");
    }

    #[test]
    fn response_keeps_client_message() {
        let response = AppError::InvalidParameter("invalid group_by".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
    }
}
