use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use seatwise_core::CoreError;
use seatwise_orch::SagaError;

/// HTTP edge of the error taxonomy. Every response body is
/// `{"error": {"code", "message", ...}}` with the status code carrying the
/// error class.
#[derive(Debug)]
pub enum AppError {
    Core(CoreError),
    Saga(SagaError),
    Unauthorized(String),
    Forbidden(String),
    Unavailable(String),
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl From<SagaError> for AppError {
    fn from(err: SagaError) -> Self {
        Self::Saga(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Core(err) => {
                let status = match &err {
                    CoreError::Validation(_) => StatusCode::BAD_REQUEST,
                    CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                    CoreError::Conflict { .. } => StatusCode::CONFLICT,
                    CoreError::Upstream(_) => StatusCode::BAD_REQUEST,
                    CoreError::ProtocolViolation(_) => StatusCode::BAD_GATEWAY,
                    CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };

                let mut body = json!({
                    "code": err.code(),
                    "message": err.to_string(),
                });
                if let CoreError::Conflict { requested, available } = &err {
                    body["requested"] = json!(requested);
                    body["available"] = json!(available);
                }
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!("internal error: {err}");
                    body["message"] = json!("Internal server error");
                }
                (status, body)
            }
            AppError::Saga(err) => {
                let status = match err {
                    SagaError::BookingInvalidResponse(_) => StatusCode::BAD_GATEWAY,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, json!({"code": err.code(), "message": err.to_string()}))
            }
            AppError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                json!({"code": "UNAUTHORIZED", "message": message}),
            ),
            AppError::Forbidden(message) => (
                StatusCode::FORBIDDEN,
                json!({"code": "FORBIDDEN", "message": message}),
            ),
            AppError::Unavailable(message) => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({"code": "SERVICE_UNAVAILABLE", "message": message}),
            ),
        };

        (status, Json(json!({ "error": error }))).into_response()
    }
}
