//! Leave request validation and state transitions.
//!
//! Every ledger mutation is first validated here. The functions are pure:
//! the caller supplies the facts it read from storage (conflicting approved
//! leave, current balances) and receives either an error or the action to
//! persist.

use chrono::{DateTime, NaiveDate, Utc};
use payline_shared::types::{LeaveRequestId, UserId};

use crate::access::ActorContext;
use crate::leave::balance::LeaveBalances;
use crate::leave::error::LeaveError;
use crate::leave::types::{DateRange, LeaveRequest, LeaveStatus, LeaveType};

/// A validated transition out of `Pending`, with its audit data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveAction {
    /// Approve the request and deduct `days` when `deducts_balance`.
    Approve {
        /// Approver.
        approved_by: UserId,
        /// Approval time.
        approved_at: DateTime<Utc>,
        /// Days to deduct (the cached `computed_days`).
        days: i32,
        /// False for unpaid leave.
        deducts_balance: bool,
    },
    /// Reject the request.
    Reject {
        /// Approver who rejected.
        rejected_by: UserId,
        /// Optional reason.
        reason: Option<String>,
    },
    /// Cancel the request.
    Cancel {
        /// Owner or approver who cancelled.
        cancelled_by: UserId,
    },
}

impl LeaveAction {
    /// Returns the status the request moves to.
    #[must_use]
    pub fn new_status(&self) -> LeaveStatus {
        match self {
            Self::Approve { .. } => LeaveStatus::Approved,
            Self::Reject { .. } => LeaveStatus::Rejected,
            Self::Cancel { .. } => LeaveStatus::Cancelled,
        }
    }
}

/// Stateless service holding the ledger rules.
pub struct LeaveService;

impl LeaveService {
    /// Validates the date range and returns the inclusive day count.
    pub fn requested_days(start: NaiveDate, end: NaiveDate) -> Result<i32, LeaveError> {
        let range = DateRange::new(start, end)?;
        i32::try_from(range.inclusive_days())
            .map_err(|_| LeaveError::Validation("leave range is too long".to_string()))
    }

    /// Validates a new application and returns the days to cache on it.
    ///
    /// Checks, in order: date range, overlap with an approved leave, balance.
    pub fn validate_apply(
        leave_type: LeaveType,
        start: NaiveDate,
        end: NaiveDate,
        approved_overlap: Option<LeaveRequestId>,
        balances: &LeaveBalances,
    ) -> Result<i32, LeaveError> {
        let days = Self::requested_days(start, end)?;
        Self::ensure_no_overlap(approved_overlap)?;
        balances.ensure_covers(leave_type, i64::from(days))?;
        Ok(days)
    }

    /// Fails with a conflict if an approved leave overlaps.
    pub fn ensure_no_overlap(approved_overlap: Option<LeaveRequestId>) -> Result<(), LeaveError> {
        match approved_overlap {
            Some(conflicting) => Err(LeaveError::OverlapsApprovedLeave {
                conflicting: conflicting.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Only approvers (admin, hr, payroll) may decide on leave.
    pub fn authorize_decision(actor: &ActorContext) -> Result<(), LeaveError> {
        if actor.is_leave_approver() {
            Ok(())
        } else {
            Err(LeaveError::Forbidden(format!(
                "role {} cannot decide on leave requests",
                actor.role
            )))
        }
    }

    /// Approves a pending request.
    ///
    /// `approved_overlap` and `balances` must be re-read at approval time;
    /// the state may have changed since the request was filed.
    pub fn approve(
        request: &LeaveRequest,
        approver: &ActorContext,
        approved_overlap: Option<LeaveRequestId>,
        balances: &LeaveBalances,
    ) -> Result<LeaveAction, LeaveError> {
        Self::authorize_decision(approver)?;
        Self::ensure_transition(request, LeaveStatus::Approved)?;
        Self::ensure_no_overlap(approved_overlap.filter(|id| *id != request.id))?;

        let deducts_balance = request.leave_type.is_paid();
        if deducts_balance {
            balances.ensure_covers(request.leave_type, i64::from(request.computed_days))?;
        }

        Ok(LeaveAction::Approve {
            approved_by: approver.id,
            approved_at: Utc::now(),
            days: request.computed_days,
            deducts_balance,
        })
    }

    /// Rejects a pending request. Blank reasons are dropped.
    pub fn reject(
        request: &LeaveRequest,
        approver: &ActorContext,
        reason: Option<String>,
    ) -> Result<LeaveAction, LeaveError> {
        Self::authorize_decision(approver)?;
        Self::ensure_transition(request, LeaveStatus::Rejected)?;

        Ok(LeaveAction::Reject {
            rejected_by: approver.id,
            reason: reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
        })
    }

    /// Cancels a pending request on behalf of its owner or an approver.
    pub fn cancel(request: &LeaveRequest, actor: &ActorContext) -> Result<LeaveAction, LeaveError> {
        if actor.id != request.user_id && !actor.is_leave_approver() {
            return Err(LeaveError::Forbidden(
                "only the owner or an approver can cancel a leave request".to_string(),
            ));
        }
        Self::ensure_transition(request, LeaveStatus::Cancelled)?;

        Ok(LeaveAction::Cancel {
            cancelled_by: actor.id,
        })
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions: Pending → Approved | Rejected | Cancelled.
    #[must_use]
    pub fn is_valid_transition(from: LeaveStatus, to: LeaveStatus) -> bool {
        matches!(
            (from, to),
            (
                LeaveStatus::Pending,
                LeaveStatus::Approved | LeaveStatus::Rejected | LeaveStatus::Cancelled
            )
        )
    }

    fn ensure_transition(request: &LeaveRequest, to: LeaveStatus) -> Result<(), LeaveError> {
        if Self::is_valid_transition(request.status, to) {
            Ok(())
        } else {
            Err(LeaveError::InvalidState {
                status: request.status,
            })
        }
    }
}
