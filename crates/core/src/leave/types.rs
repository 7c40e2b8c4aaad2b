//! Leave domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use payline_shared::types::{LeaveRequestId, UserId};

use crate::leave::error::LeaveError;

/// Category of leave.
///
/// Every type except `Unpaid` draws on a per-employee balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LeaveType {
    /// Sick leave.
    Sick,
    /// Casual leave.
    Casual,
    /// Earned (privilege) leave.
    Earned,
    /// Unpaid leave, unlimited.
    Unpaid,
}

impl LeaveType {
    /// All leave types.
    pub const ALL: [Self; 4] = [Self::Sick, Self::Casual, Self::Earned, Self::Unpaid];

    /// Leave types that consume a balance.
    pub const PAID: [Self; 3] = [Self::Sick, Self::Casual, Self::Earned];

    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sick => "SICK",
            Self::Casual => "CASUAL",
            Self::Earned => "EARNED",
            Self::Unpaid => "UNPAID",
        }
    }

    /// Parses a leave type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SICK" => Some(Self::Sick),
            "CASUAL" => Some(Self::Casual),
            "EARNED" => Some(Self::Earned),
            "UNPAID" => Some(Self::Unpaid),
            _ => None,
        }
    }

    /// Returns true if approving this type deducts from a balance.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        !matches!(self, Self::Unpaid)
    }

    /// Days granted to an employee who has no balance recorded yet.
    #[must_use]
    pub fn default_allowance(&self) -> Option<i32> {
        match self {
            Self::Sick => Some(10),
            Self::Casual => Some(12),
            Self::Earned => Some(15),
            Self::Unpaid => None,
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a leave request.
///
/// `Pending` is the only mutable state; the other three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LeaveStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved; balance has been deducted.
    Approved,
    /// Rejected by an approver.
    Rejected,
    /// Withdrawn before a decision.
    Cancelled,
}

impl LeaveStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the range.
    pub start: NaiveDate,
    /// Last day of the range (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, LeaveError> {
        if end < start {
            return Err(LeaveError::Validation(format!(
                "end date {end} is before start date {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of calendar days in the range, counting both ends.
    ///
    /// Never negative, even for a reversed pair built without `new`.
    #[must_use]
    pub fn inclusive_days(&self) -> i64 {
        (self.end.signed_duration_since(self.start).num_days() + 1).max(0)
    }

    /// Returns true if the two ranges share at least one day.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Returns the part of `self` that falls inside `bounds`.
    #[must_use]
    pub fn clip_to(&self, bounds: &Self) -> Option<Self> {
        let start = self.start.max(bounds.start);
        let end = self.end.min(bounds.end);
        (start <= end).then_some(Self { start, end })
    }

    /// Returns true if `date` lies within the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A leave request as stored by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    /// Unique identifier.
    pub id: LeaveRequestId,
    /// Employee the leave is for.
    pub user_id: UserId,
    /// Leave category.
    pub leave_type: LeaveType,
    /// Current status.
    pub status: LeaveStatus,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Reason given by the applicant.
    pub reason: Option<String>,
    /// Day count fixed at apply time; approval deducts exactly this.
    pub computed_days: i32,
    /// Approver, once approved.
    pub approved_by: Option<UserId>,
    /// Approval time, once approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// Who rejected or cancelled the request.
    pub decided_by: Option<UserId>,
    /// Reason recorded on rejection.
    pub decision_reason: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Returns the request's date range.
    #[must_use]
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_leave_type_round_trip() {
        for t in LeaveType::ALL {
            assert_eq!(LeaveType::parse(t.as_str()), Some(t));
        }
        assert_eq!(LeaveType::parse("casual"), Some(LeaveType::Casual));
        assert_eq!(LeaveType::parse("maternity"), None);
    }

    #[test]
    fn test_default_allowances() {
        assert_eq!(LeaveType::Sick.default_allowance(), Some(10));
        assert_eq!(LeaveType::Casual.default_allowance(), Some(12));
        assert_eq!(LeaveType::Earned.default_allowance(), Some(15));
        assert_eq!(LeaveType::Unpaid.default_allowance(), None);
        assert!(!LeaveType::Unpaid.is_paid());
    }

    #[test]
    fn test_status_terminality() {
        assert!(!LeaveStatus::Pending.is_terminal());
        assert!(LeaveStatus::Approved.is_terminal());
        assert!(LeaveStatus::Rejected.is_terminal());
        assert!(LeaveStatus::Cancelled.is_terminal());
        assert_eq!(LeaveStatus::parse("approved"), Some(LeaveStatus::Approved));
    }

    #[test]
    fn test_serde_uses_uppercase() {
        assert_eq!(
            serde_json::to_string(&LeaveType::Earned).unwrap(),
            "\"EARNED\""
        );
        assert_eq!(
            serde_json::to_string(&LeaveStatus::Cancelled).unwrap(),
            "\"CANCELLED\""
        );
    }

    #[test]
    fn test_single_day_range_counts_one() {
        let range = DateRange::new(d(2025, 3, 10), d(2025, 3, 10)).unwrap();
        assert_eq!(range.inclusive_days(), 1);
    }

    #[test]
    fn test_range_days_across_month_end() {
        let range = DateRange::new(d(2025, 2, 27), d(2025, 3, 2)).unwrap();
        assert_eq!(range.inclusive_days(), 4);
    }

    #[test]
    fn test_reversed_range_rejected() {
        let err = DateRange::new(d(2025, 3, 10), d(2025, 3, 9)).unwrap_err();
        assert!(matches!(err, LeaveError::Validation(_)));

        let raw = DateRange {
            start: d(2025, 3, 10),
            end: d(2025, 3, 1),
        };
        assert_eq!(raw.inclusive_days(), 0);
    }

    #[test]
    fn test_overlap_and_clip() {
        let a = DateRange::new(d(2025, 3, 1), d(2025, 3, 5)).unwrap();
        let b = DateRange::new(d(2025, 3, 5), d(2025, 3, 9)).unwrap();
        let c = DateRange::new(d(2025, 3, 6), d(2025, 3, 9)).unwrap();

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert_eq!(
            b.clip_to(&a),
            Some(DateRange {
                start: d(2025, 3, 5),
                end: d(2025, 3, 5)
            })
        );
        assert_eq!(c.clip_to(&a), None);
    }
}
