use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::app_error::{AppError, ErrorCode};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        tracing::error!(error = ?self, "Request failed");

        match self {
            AppError::Validation(violations) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "code": ErrorCode::ValidationFailed.as_str(),
                    "errors": violations,
                })),
            )
                .into_response(),
            // The message is the response body; the reset paths intentionally
            // name the email/user id they could not find, login does not.
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            AppError::LockedOut => StatusCode::BAD_REQUEST.into_response(),
            AppError::InvalidCredentials => {
                (StatusCode::NOT_FOUND, "Email ou Senha inválidos!").into_response()
            }
            AppError::Signing(_) => {
                error_resp(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::SigningError)
            }
            AppError::Unavailable(_) => {
                error_resp(StatusCode::SERVICE_UNAVAILABLE, ErrorCode::StoreUnavailable)
            }
            AppError::Database(_) => {
                error_resp(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError)
            }
            AppError::Internal(_) => {
                error_resp(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError)
            }
        }
    }
}

fn error_resp(status: StatusCode, code: ErrorCode) -> Response {
    (status, Json(serde_json::json!({ "code": code.as_str() }))).into_response()
}
