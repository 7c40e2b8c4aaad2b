//! Error responses.
//!
//! Every failure leaves the API as `{ "error": CODE, "message": text }` with
//! the status the domain error dictates. Server-side failures are logged and
//! replaced by a generic message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use payline_core::leave::LeaveError;
use payline_core::payroll::PayrollError;
use payline_shared::AppError;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// An error ready to be rendered as an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status.
    pub status: StatusCode,
    /// Machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    fn from_parts(status: u16, code: &'static str, message: String) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(code, error = %message, "Request failed");
            return Self {
                status,
                code,
                message: INTERNAL_MESSAGE.to_string(),
            };
        }
        Self {
            status,
            code,
            message,
        }
    }

    /// 401 with the given message.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized(message.into()).into()
    }

    /// 400 with the given message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        Self::from_parts(e.status_code(), e.error_code(), e.message().to_string())
    }
}

impl From<LeaveError> for ApiError {
    fn from(e: LeaveError) -> Self {
        Self::from_parts(e.status_code(), e.error_code(), e.to_string())
    }
}

impl From<PayrollError> for ApiError {
    fn from(e: PayrollError) -> Self {
        Self::from_parts(e.status_code(), e.error_code(), e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::validation(e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        Self::validation(e.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payline_core::leave::LeaveStatus;
    use payline_shared::types::{LeaveRequestId, UserId};

    #[test]
    fn test_leave_errors_keep_their_status() {
        let e: ApiError = LeaveError::NotFound(LeaveRequestId::new()).into();
        assert_eq!(e.status, StatusCode::NOT_FOUND);

        let e: ApiError = LeaveError::InvalidState {
            status: LeaveStatus::Approved,
        }
        .into();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.code, "INVALID_STATE");
    }

    #[test]
    fn test_payroll_errors_keep_their_status() {
        let e: ApiError = PayrollError::DuplicatePayrun {
            year: 2025,
            month: 3,
        }
        .into();
        assert_eq!(e.status, StatusCode::CONFLICT);

        let e: ApiError = PayrollError::MissingSalary {
            user_id: UserId::new(),
        }
        .into();
        assert_eq!(e.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_server_errors_hide_details() {
        let e: ApiError = PayrollError::Database("connection refused".to_string()).into();
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.code, "DATABASE_ERROR");
        assert_eq!(e.message, INTERNAL_MESSAGE);
    }

    #[test]
    fn test_client_errors_keep_message() {
        let e = ApiError::validation("end date before start date");
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.code, "VALIDATION_ERROR");
        assert_eq!(e.message, "end date before start date");
    }
}
