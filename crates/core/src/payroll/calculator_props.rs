//! Property-based tests for the salary calculator.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::{FormulaVersion, PayrollCalculator, PayrollInput, round_money};

fn arb_salary() -> impl Strategy<Value = Decimal> {
    // Up to 10,000,000.00 in cents.
    (0i64..1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_score() -> impl Strategy<Value = Decimal> {
    (-50i64..150).prop_map(|tenths| Decimal::new(tenths, 1))
}

fn arb_formula() -> impl Strategy<Value = FormulaVersion> {
    prop_oneof![Just(FormulaVersion::Standard), Just(FormulaVersion::Legacy)]
}

prop_compose! {
    fn arb_input()(
        basic_salary in arb_salary(),
        office_score in arb_score(),
        working_days in 0u32..31,
        present_days in 0u32..35,
        extra_paid_leave_hours in 0u32..400,
        standard_work_hours_per_day in 0u32..13,
        flat in proptest::option::of(0i64..100_000),
    ) -> PayrollInput {
        PayrollInput {
            basic_salary,
            office_score,
            present_days,
            working_days,
            extra_paid_leave_hours,
            standard_work_hours_per_day,
            professional_tax_flat: flat.map(|cents| Decimal::new(cents, 2)),
        }
    }
}

proptest! {
    #[test]
    fn prop_compute_is_deterministic(input in arb_input(), formula in arb_formula()) {
        let first = PayrollCalculator::compute(&input, formula);
        let second = PayrollCalculator::compute(&input.clone(), formula);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn prop_net_within_zero_and_gross(input in arb_input(), formula in arb_formula()) {
        let b = PayrollCalculator::compute(&input, formula);
        prop_assert!(b.net >= Decimal::ZERO);
        prop_assert!(b.net <= b.gross);
        prop_assert!(b.net_before_leave_deductions >= b.net);
    }

    #[test]
    fn prop_amounts_have_at_most_two_decimals(input in arb_input(), formula in arb_formula()) {
        let b = PayrollCalculator::compute(&input, formula);
        for amount in [b.gross, b.day_deduction, b.paid_leave_hour_deduction, b.total_deductions, b.net, b.ctc] {
            prop_assert_eq!(round_money(amount), amount);
        }
    }

    #[test]
    fn prop_more_absence_never_raises_net(input in arb_input(), formula in arb_formula()) {
        prop_assume!(input.present_days > 0);
        let fewer = PayrollInput { present_days: input.present_days - 1, ..input.clone() };
        let with_more_absence = PayrollCalculator::compute(&fewer, formula);
        let baseline = PayrollCalculator::compute(&input, formula);
        prop_assert!(with_more_absence.net <= baseline.net);
    }

    #[test]
    fn prop_standard_gross_is_sum_of_components(input in arb_input()) {
        let b = PayrollCalculator::compute(&input, FormulaVersion::Standard);
        prop_assert_eq!(b.gross, b.basic + b.hra + b.bonus);
        prop_assert_eq!(b.ctc, b.gross + b.employer_pf);
    }
}
