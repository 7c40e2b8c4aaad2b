//! Property-based tests for the leave ledger rules.

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use payline_shared::types::{LeaveRequestId, UserId};

use crate::access::{ActorContext, Role};
use crate::leave::balance::{Allowance, LeaveBalances};
use crate::leave::error::LeaveError;
use crate::leave::service::{LeaveAction, LeaveService};
use crate::leave::types::{DateRange, LeaveRequest, LeaveStatus, LeaveType};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..365).prop_map(|offset| base_date() + Duration::days(offset))
}

fn arb_range() -> impl Strategy<Value = DateRange> {
    (arb_date(), 0i64..10).prop_map(|(start, len)| DateRange {
        start,
        end: start + Duration::days(len),
    })
}

fn arb_leave_type() -> impl Strategy<Value = LeaveType> {
    prop_oneof![
        Just(LeaveType::Sick),
        Just(LeaveType::Casual),
        Just(LeaveType::Earned),
        Just(LeaveType::Unpaid),
    ]
}

fn arb_terminal_status() -> impl Strategy<Value = LeaveStatus> {
    prop_oneof![
        Just(LeaveStatus::Approved),
        Just(LeaveStatus::Rejected),
        Just(LeaveStatus::Cancelled),
    ]
}

fn request(user_id: UserId, leave_type: LeaveType, range: DateRange) -> LeaveRequest {
    LeaveRequest {
        id: LeaveRequestId::new(),
        user_id,
        leave_type,
        status: LeaveStatus::Pending,
        start_date: range.start,
        end_date: range.end,
        reason: None,
        computed_days: i32::try_from(range.inclusive_days()).unwrap(),
        approved_by: None,
        approved_at: None,
        decided_by: None,
        decision_reason: None,
        created_at: Utc::now(),
    }
}

/// Replays applications through the rules the way the repository does,
/// keeping approved ranges and balances in memory.
struct Replay {
    balances: LeaveBalances,
    approved: Vec<LeaveRequest>,
}

impl Replay {
    fn overlap(&self, range: &DateRange) -> Option<LeaveRequestId> {
        self.approved
            .iter()
            .find(|r| r.range().overlaps(range))
            .map(|r| r.id)
    }

    fn apply_and_approve(&mut self, user_id: UserId, leave_type: LeaveType, range: DateRange) {
        let applied = LeaveService::validate_apply(
            leave_type,
            range.start,
            range.end,
            self.overlap(&range),
            &self.balances,
        );
        if applied.is_err() {
            return;
        }

        let mut req = request(user_id, leave_type, range);
        let approver = ActorContext::new(UserId::new(), Role::Hr);
        let action =
            LeaveService::approve(&req, &approver, self.overlap(&range), &self.balances);

        if let Ok(LeaveAction::Approve {
            days,
            deducts_balance,
            ..
        }) = action
        {
            if deducts_balance {
                let remaining = match self.balances.available(leave_type) {
                    Allowance::Limited(n) => n - days,
                    Allowance::Unlimited => unreachable!("paid leave is limited"),
                };
                let others: Vec<(LeaveType, i32)> = self
                    .balances
                    .iter()
                    .filter(|(t, _)| *t != leave_type)
                    .collect();
                self.balances = LeaveBalances::from_stored(
                    others.into_iter().chain([(leave_type, remaining)]),
                );
            }
            req.status = LeaveStatus::Approved;
            self.approved.push(req);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// computedDays = (end - start) + 1 and is at least 1 for valid ranges.
    #[test]
    fn prop_requested_days_inclusive(start in arb_date(), len in 0i64..400) {
        let end = start + Duration::days(len);
        let days = LeaveService::requested_days(start, end).unwrap();
        prop_assert_eq!(i64::from(days), len + 1);
        prop_assert!(days >= 1);
    }

    /// Reversed ranges are always a validation error.
    #[test]
    fn prop_reversed_range_rejected(start in arb_date(), back in 1i64..400) {
        let end = start - Duration::days(back);
        let result = LeaveService::requested_days(start, end);
        prop_assert!(matches!(result, Err(LeaveError::Validation(_))));
    }

    /// Overlap is symmetric and agrees with clipping.
    #[test]
    fn prop_overlap_symmetric(a in arb_range(), b in arb_range()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        prop_assert_eq!(a.overlaps(&b), a.clip_to(&b).is_some());
    }

    /// Terminal requests accept no further transition.
    #[test]
    fn prop_terminal_states_are_final(
        status in arb_terminal_status(),
        leave_type in arb_leave_type(),
        range in arb_range(),
    ) {
        let owner = UserId::new();
        let mut req = request(owner, leave_type, range);
        req.status = status;
        let admin = ActorContext::new(UserId::new(), Role::Admin);
        let balances = LeaveBalances::with_defaults();

        let is_invalid_state =
            |r: Result<LeaveAction, LeaveError>| matches!(r, Err(LeaveError::InvalidState { .. }));
        prop_assert!(is_invalid_state(LeaveService::approve(&req, &admin, None, &balances)));
        prop_assert!(is_invalid_state(LeaveService::reject(&req, &admin, None)));
        prop_assert!(is_invalid_state(LeaveService::cancel(&req, &admin)));
    }

    /// Balances never go negative and approved ranges never overlap,
    /// whatever sequence of applications arrives.
    #[test]
    fn prop_replayed_ledger_keeps_invariants(
        requests in prop::collection::vec((arb_leave_type(), arb_range()), 1..40)
    ) {
        let user_id = UserId::new();
        let mut replay = Replay {
            balances: LeaveBalances::with_defaults(),
            approved: Vec::new(),
        };

        for (leave_type, range) in requests {
            replay.apply_and_approve(user_id, leave_type, range);
        }

        for (_, days) in replay.balances.iter() {
            prop_assert!(days >= 0);
        }
        for (i, a) in replay.approved.iter().enumerate() {
            for b in &replay.approved[i + 1..] {
                prop_assert!(!a.range().overlaps(&b.range()));
            }
        }
    }

    /// A successful paid approval deducts exactly computedDays.
    #[test]
    fn prop_paid_approval_deducts_computed_days(
        range in arb_range(),
        balance in 0i32..20,
    ) {
        let req = request(UserId::new(), LeaveType::Casual, range);
        let balances = LeaveBalances::from_stored([(LeaveType::Casual, balance)]);
        let approver = ActorContext::new(UserId::new(), Role::Payroll);

        match LeaveService::approve(&req, &approver, None, &balances) {
            Ok(LeaveAction::Approve { days, .. }) => {
                prop_assert_eq!(days, req.computed_days);
                prop_assert!(balance - days >= 0);
            }
            Err(LeaveError::InsufficientBalance { requested, available, .. }) => {
                prop_assert!(requested > available);
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }
}
