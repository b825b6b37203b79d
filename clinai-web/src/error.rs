//! Error types for clinai-web

use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body could not be extracted (400, or 413/415 as reported by axum)
    #[error("Invalid request: {1}")]
    Rejected(StatusCode, String),

    /// clinai-common error
    #[error(transparent)]
    Common(#[from] clinai_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Rejected(status, msg) => {
                let code = match status {
                    StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
                    StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
                    _ => "BAD_REQUEST",
                };
                (status, code, msg)
            }
            ApiError::Common(ref err) if err.is_client_error() => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", err.to_string())
            }
            ApiError::Common(ref err) => {
                // Oracle failures and contract violations abort the request
                error!("Assessment failed: {}", err);
                let code = match err {
                    clinai_common::Error::ContractViolation(_) => "CONTRACT_VIOLATION",
                    clinai_common::Error::Oracle(_) => "ORACLE_ERROR",
                    clinai_common::Error::Report(_) => "REPORT_ERROR",
                    _ => "INTERNAL_ERROR",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, code, err.to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Size and content-type failures keep their status; everything else
/// (syntax, unknown or mistyped fields) is a plain 400
fn rejection_status(status: StatusCode) -> StatusCode {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE | StatusCode::UNSUPPORTED_MEDIA_TYPE => status,
        _ => StatusCode::BAD_REQUEST,
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected(rejection_status(rejection.status()), rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::Rejected(rejection_status(rejection.status()), rejection.body_text())
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
