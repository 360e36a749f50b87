//! JSON responder that always declares a UTF-8 charset.
//!
//! `axum::Json` answers with a bare `application/json`; clients of the
//! public APIs expect the charset spelled out, and names with accents must
//! pass through unescaped.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub const JSON_UTF8: &str = "application/json; charset=utf-8";

#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Json<T>(pub T);

impl<T> IntoResponse for Utf8Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(body) => (
                [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8))],
                body,
            )
                .into_response(),
            Err(err) => {
                tracing::error!(error = %err, "Failed to serialize response body");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8))],
                    r#"{"error":"Internal server error"}"#,
                )
                    .into_response()
            }
        }
    }
}
