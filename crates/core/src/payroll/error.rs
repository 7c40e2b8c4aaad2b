//! Payroll error types.

use thiserror::Error;
use payline_shared::types::{PayrunId, UserId};

/// Errors that can occur during payroll operations.
#[derive(Debug, Error)]
pub enum PayrollError {
    /// Malformed input, e.g. a period ending before it starts.
    #[error("Invalid payroll input: {0}")]
    Validation(String),

    /// The actor's role does not permit the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Payrun does not exist.
    #[error("Payrun {0} not found")]
    PayrunNotFound(PayrunId),

    /// A payrun already exists for the calendar month.
    #[error("Payrun already exists for {year}-{month:02}")]
    DuplicatePayrun {
        /// Calendar year.
        year: i32,
        /// Calendar month (1-12).
        month: u32,
    },

    /// An employee has no salary and the policy is to fail.
    #[error("Employee {user_id} has no basic salary on record")]
    MissingSalary {
        /// The employee without a salary.
        user_id: UserId,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl PayrollError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Forbidden(_) => 403,
            Self::PayrunNotFound(_) => 404,
            Self::DuplicatePayrun { .. } => 409,
            Self::MissingSalary { .. } => 422,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::PayrunNotFound(_) => "PAYRUN_NOT_FOUND",
            Self::DuplicatePayrun { .. } => "PAYRUN_EXISTS",
            Self::MissingSalary { .. } => "MISSING_SALARY",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
