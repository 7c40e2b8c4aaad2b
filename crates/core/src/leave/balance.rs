//! Per-employee leave balances.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::leave::error::LeaveError;
use crate::leave::types::LeaveType;

/// Days available for a leave type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allowance {
    /// A finite number of days.
    Limited(i32),
    /// No limit (unpaid leave).
    Unlimited,
}

impl Allowance {
    /// Returns true if `days` can be drawn.
    #[must_use]
    pub fn covers(&self, days: i64) -> bool {
        match self {
            Self::Limited(available) => days <= i64::from(*available),
            Self::Unlimited => true,
        }
    }
}

/// Remaining days per paid leave type.
///
/// Unpaid leave is never stored; it is always `Allowance::Unlimited`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalances {
    days: BTreeMap<LeaveType, i32>,
}

impl LeaveBalances {
    /// Balances provisioned for an employee with no history.
    #[must_use]
    pub fn with_defaults() -> Self {
        let days = LeaveType::PAID
            .iter()
            .filter_map(|t| t.default_allowance().map(|d| (*t, d)))
            .collect();
        Self { days }
    }

    /// Builds balances from stored rows, provisioning defaults for missing paid types.
    pub fn from_stored(rows: impl IntoIterator<Item = (LeaveType, i32)>) -> Self {
        let mut balances = Self::with_defaults();
        for (leave_type, days) in rows {
            if leave_type.is_paid() {
                balances.days.insert(leave_type, days);
            }
        }
        balances
    }

    /// Paid types present in `stored` are returned as-is; the rest need provisioning.
    #[must_use]
    pub fn missing_types(stored: &[LeaveType]) -> Vec<LeaveType> {
        LeaveType::PAID
            .iter()
            .copied()
            .filter(|t| !stored.contains(t))
            .collect()
    }

    /// Returns the allowance for `leave_type`.
    #[must_use]
    pub fn available(&self, leave_type: LeaveType) -> Allowance {
        if leave_type.is_paid() {
            Allowance::Limited(self.days.get(&leave_type).copied().unwrap_or(0))
        } else {
            Allowance::Unlimited
        }
    }

    /// Fails with `InsufficientBalance` unless `days` of `leave_type` are available.
    pub fn ensure_covers(&self, leave_type: LeaveType, days: i64) -> Result<(), LeaveError> {
        let allowance = self.available(leave_type);
        if allowance.covers(days) {
            return Ok(());
        }
        let available = match allowance {
            Allowance::Limited(n) => i64::from(n),
            Allowance::Unlimited => i64::MAX,
        };
        Err(LeaveError::InsufficientBalance {
            leave_type,
            requested: days,
            available,
        })
    }

    /// Sum of all remaining paid days.
    #[must_use]
    pub fn total_paid(&self) -> i64 {
        self.days.values().map(|d| i64::from(*d)).sum()
    }

    /// Iterates `(type, days)` pairs for paid types.
    pub fn iter(&self) -> impl Iterator<Item = (LeaveType, i32)> + '_ {
        self.days.iter().map(|(t, d)| (*t, *d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let balances = LeaveBalances::with_defaults();
        assert_eq!(balances.available(LeaveType::Sick), Allowance::Limited(10));
        assert_eq!(balances.available(LeaveType::Casual), Allowance::Limited(12));
        assert_eq!(balances.available(LeaveType::Earned), Allowance::Limited(15));
        assert_eq!(balances.available(LeaveType::Unpaid), Allowance::Unlimited);
        assert_eq!(balances.total_paid(), 37);
    }

    #[test]
    fn test_stored_rows_override_defaults() {
        let balances =
            LeaveBalances::from_stored([(LeaveType::Casual, 5), (LeaveType::Unpaid, 99)]);
        assert_eq!(balances.available(LeaveType::Casual), Allowance::Limited(5));
        assert_eq!(balances.available(LeaveType::Sick), Allowance::Limited(10));
        assert_eq!(balances.available(LeaveType::Unpaid), Allowance::Unlimited);
        assert_eq!(balances.iter().count(), 3);
    }

    #[test]
    fn test_missing_types() {
        assert_eq!(
            LeaveBalances::missing_types(&[LeaveType::Sick]),
            vec![LeaveType::Casual, LeaveType::Earned]
        );
        assert!(LeaveBalances::missing_types(&LeaveType::PAID).is_empty());
    }

    #[test]
    fn test_ensure_covers() {
        let balances = LeaveBalances::from_stored([(LeaveType::Casual, 3)]);
        assert!(balances.ensure_covers(LeaveType::Casual, 3).is_ok());

        let err = balances.ensure_covers(LeaveType::Casual, 4).unwrap_err();
        match err {
            LeaveError::InsufficientBalance {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 4);
                assert_eq!(available, 3);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(balances.ensure_covers(LeaveType::Unpaid, 365).is_ok());
        assert!(Allowance::Limited(0).covers(0));
        assert!(!Allowance::Limited(0).covers(1));
    }
}
