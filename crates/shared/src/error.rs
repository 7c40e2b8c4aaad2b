//! The application's error taxonomy.
//!
//! Domain crates keep their own error enums. Anything that reaches a caller
//! is expressed in these terms, which fix the HTTP status and the wire code.

use thiserror::Error;

/// Shorthand for results failing with [`AppError`].
pub type AppResult<T> = Result<T, AppError>;

/// Caller-facing failure categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or unusable credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller's role does not allow the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// No such entity.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed input.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A leave balance cannot cover the request.
    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),

    /// The entity is no longer in a state that allows the operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Duplicate payrun or overlapping approved leave.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Input is well formed but cannot be processed, e.g. a missing salary
    /// under a fail-fast policy.
    #[error("unprocessable: {0}")]
    Unprocessable(String),

    /// Storage failure.
    #[error("database error: {0}")]
    Database(String),

    /// Anything else that is the server's fault.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InsufficientBalance(_) | Self::InvalidState(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Unprocessable(_) => 422,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Machine-readable code sent in the `error` field.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InsufficientBalance(_) => "INSUFFICIENT_BALANCE",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::Conflict(_) => "CONFLICT",
            Self::Unprocessable(_) => "UNPROCESSABLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The detail message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Validation(m)
            | Self::InsufficientBalance(m)
            | Self::InvalidState(m)
            | Self::Conflict(m)
            | Self::Unprocessable(m)
            | Self::Database(m)
            | Self::Internal(m) => m,
        }
    }

    /// True for failures the caller cannot fix.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Unauthorized(String::new()), 401, "UNAUTHORIZED")]
    #[case(AppError::Forbidden(String::new()), 403, "FORBIDDEN")]
    #[case(AppError::NotFound(String::new()), 404, "NOT_FOUND")]
    #[case(AppError::Validation(String::new()), 400, "VALIDATION_ERROR")]
    #[case(AppError::InsufficientBalance(String::new()), 400, "INSUFFICIENT_BALANCE")]
    #[case(AppError::InvalidState(String::new()), 400, "INVALID_STATE")]
    #[case(AppError::Conflict(String::new()), 409, "CONFLICT")]
    #[case(AppError::Unprocessable(String::new()), 422, "UNPROCESSABLE")]
    #[case(AppError::Database(String::new()), 500, "DATABASE_ERROR")]
    #[case(AppError::Internal(String::new()), 500, "INTERNAL_ERROR")]
    fn test_status_and_code(#[case] err: AppError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_display_and_message() {
        let err = AppError::Conflict("payrun 2025-03 exists".into());
        assert_eq!(err.to_string(), "conflict: payrun 2025-03 exists");
        assert_eq!(err.message(), "payrun 2025-03 exists");
    }

    #[test]
    fn test_server_error_classification() {
        assert!(AppError::Database("down".into()).is_server_error());
        assert!(!AppError::Validation("bad".into()).is_server_error());
    }
}
