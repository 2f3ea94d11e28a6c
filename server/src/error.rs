//! JSON error responses.
//!
//! Every error body has the same shape:
//!
//! ```json
//! { "error": { "code": "not_found", "message": "Invoice abc not found" } }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use invoicewatch::analyzer::AnalyzeError;
use invoicewatch::intake::IntakeError;
use invoicewatch::store::StoreError;
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "batch_running", message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "Record store failure");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
    }
}

impl From<AnalyzeError> for AppError {
    fn from(err: AnalyzeError) -> Self {
        let (status, code) = match &err {
            AnalyzeError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "analyzer_timeout"),
            AnalyzeError::Transport(_) | AnalyzeError::Provider { .. } => {
                (StatusCode::BAD_GATEWAY, "analyzer_unavailable")
            }
            AnalyzeError::Rejected(_)
            | AnalyzeError::InvalidResponse(_)
            | AnalyzeError::EmptyDocument(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "analysis_failed")
            }
            AnalyzeError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "analyzer_config"),
        };
        Self::new(status, code, err.to_string())
    }
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        let message = err.to_string();
        let mut mapped = match err {
            IntakeError::Analyze { source, .. } => AppError::from(source),
            IntakeError::Store { source, .. } => AppError::from(source),
        };
        mapped.message = message;
        mapped
    }
}
