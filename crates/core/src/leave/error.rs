//! Leave ledger error types.

use thiserror::Error;
use payline_shared::types::LeaveRequestId;

use crate::leave::types::{LeaveStatus, LeaveType};

/// Errors that can occur during leave operations.
#[derive(Debug, Error)]
pub enum LeaveError {
    /// Malformed input, e.g. end date before start date.
    #[error("Invalid leave request: {0}")]
    Validation(String),

    /// The actor's role does not permit the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Leave request does not exist.
    #[error("Leave request {0} not found")]
    NotFound(LeaveRequestId),

    /// The range overlaps an approved leave of the same employee.
    #[error("Overlaps approved leave {conflicting}")]
    OverlapsApprovedLeave {
        /// The approved request that overlaps.
        conflicting: String,
    },

    /// The balance does not cover the requested days.
    #[error("Insufficient {leave_type} balance: requested {requested} day(s), available {available}")]
    InsufficientBalance {
        /// The leave type being drawn on.
        leave_type: LeaveType,
        /// Days requested.
        requested: i64,
        /// Days available.
        available: i64,
    },

    /// The request is no longer pending.
    #[error("Leave request is {status}, only PENDING requests can change")]
    InvalidState {
        /// The request's current status.
        status: LeaveStatus,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LeaveError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InsufficientBalance { .. } | Self::InvalidState { .. } => {
                400
            }
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::OverlapsApprovedLeave { .. } => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "LEAVE_NOT_FOUND",
            Self::OverlapsApprovedLeave { .. } => "LEAVE_OVERLAP",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_balance_is_bad_request() {
        let err = LeaveError::InsufficientBalance {
            leave_type: LeaveType::Casual,
            requested: 4,
            available: 3,
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");
        assert!(err.to_string().contains("CASUAL"));
    }

    #[test]
    fn test_overlap_is_conflict() {
        let err = LeaveError::OverlapsApprovedLeave {
            conflicting: LeaveRequestId::new().to_string(),
        };
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_state_and_lookup_errors() {
        let err = LeaveError::InvalidState {
            status: LeaveStatus::Approved,
        };
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("APPROVED"));

        assert_eq!(LeaveError::NotFound(LeaveRequestId::new()).status_code(), 404);
        assert_eq!(LeaveError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(LeaveError::Database("x".into()).status_code(), 500);
    }
}
