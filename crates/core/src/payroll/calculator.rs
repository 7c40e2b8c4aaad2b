//! Per-employee salary computation.
//!
//! Every intermediate monetary value is rounded to two decimal places
//! (midpoint away from zero) before it feeds the next step, so results are
//! reproducible to the cent regardless of evaluation order.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::PayrollError;

/// Rounds a monetary amount to two decimal places, midpoint away from zero.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Salary computation strategy.
///
/// Exactly one version is selected per payrun and its tag is persisted with
/// the run, so historical payslips can always be explained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaVersion {
    /// Component-based formula: basic, HRA, bonus, statutory deductions.
    #[default]
    Standard,
    /// Flat-gross formula: basic salary minus PF, professional tax and unpaid days.
    Legacy,
}

impl FormulaVersion {
    /// Stable tag stored on the payrun.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Standard => "standard-v2",
            Self::Legacy => "legacy-v1",
        }
    }

    /// Parses a configured formula name or a stored tag.
    pub fn parse(value: &str) -> Result<Self, PayrollError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" | "standard-v2" => Ok(Self::Standard),
            "legacy" | "legacy-v1" => Ok(Self::Legacy),
            other => Err(PayrollError::Validation(format!(
                "unknown payroll formula '{other}'"
            ))),
        }
    }
}

impl fmt::Display for FormulaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Inputs for a single employee's salary computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollInput {
    /// Monthly basic salary.
    pub basic_salary: Decimal,
    /// Performance score in `[0, 10]`; values outside are clamped.
    #[serde(default = "default_office_score")]
    pub office_score: Decimal,
    /// Days with attendance inside the period.
    pub present_days: u32,
    /// Weekdays in the period.
    pub working_days: u32,
    /// Paid-leave hours beyond the employee's allowance.
    #[serde(default)]
    pub extra_paid_leave_hours: u32,
    /// Hours in a standard working day.
    #[serde(default = "default_hours_per_day")]
    pub standard_work_hours_per_day: u32,
    /// Legacy formula only: overrides the professional tax slab.
    #[serde(default)]
    pub professional_tax_flat: Option<Decimal>,
}

fn default_office_score() -> Decimal {
    Decimal::TEN
}

const fn default_hours_per_day() -> u32 {
    8
}

impl PayrollInput {
    /// Creates an input with default score, hours and no extra leave.
    #[must_use]
    pub fn new(basic_salary: Decimal, present_days: u32, working_days: u32) -> Self {
        Self {
            basic_salary,
            office_score: default_office_score(),
            present_days,
            working_days,
            extra_paid_leave_hours: 0,
            standard_work_hours_per_day: default_hours_per_day(),
            professional_tax_flat: None,
        }
    }

    /// Days in the period without attendance.
    #[must_use]
    pub const fn absent_days(&self) -> u32 {
        self.working_days.saturating_sub(self.present_days)
    }

    /// Rejects inputs outside the ranges payroll stores.
    ///
    /// Amounts are capped at the `NUMERIC(14, 2)` column maximum and day and
    /// hour counts at one year, which keeps every intermediate product well
    /// inside `Decimal`'s range.
    ///
    /// # Errors
    ///
    /// `PayrollError::Validation` naming the first field out of range.
    pub fn validate(&self) -> Result<(), PayrollError> {
        let out_of_range = |field: &str| {
            Err(PayrollError::Validation(format!("{field} is out of range")))
        };
        if self.basic_salary > MAX_AMOUNT {
            return out_of_range("basicSalary");
        }
        if self.professional_tax_flat.is_some_and(|flat| flat > MAX_AMOUNT) {
            return out_of_range("professionalTaxFlat");
        }
        if self.working_days > MAX_DAYS {
            return out_of_range("workingDays");
        }
        if self.present_days > MAX_DAYS {
            return out_of_range("presentDays");
        }
        if self.standard_work_hours_per_day > HOURS_PER_DAY {
            return out_of_range("standardWorkHoursPerDay");
        }
        if self.extra_paid_leave_hours > MAX_DAYS * HOURS_PER_DAY {
            return out_of_range("extraPaidLeaveHours");
        }
        Ok(())
    }
}

/// Largest amount a `NUMERIC(14, 2)` column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);
const MAX_DAYS: u32 = 366;
const HOURS_PER_DAY: u32 = 24;

/// Computed salary components for one employee.
///
/// The legacy formula leaves the component fields it does not use at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryBreakdown {
    /// Formula that produced this breakdown.
    pub formula: FormulaVersion,
    /// Basic component.
    pub basic: Decimal,
    /// House rent allowance.
    pub hra: Decimal,
    /// Score-scaled bonus.
    pub bonus: Decimal,
    /// Gross pay.
    pub gross: Decimal,
    /// Gross per working day.
    pub per_day_rate: Decimal,
    /// Gross per working hour.
    pub per_hour_rate: Decimal,
    /// Working days without attendance.
    pub absent_days: u32,
    /// Deduction for absent days.
    pub day_deduction: Decimal,
    /// Deduction for paid leave beyond the allowance.
    pub paid_leave_hour_deduction: Decimal,
    /// Employee provident fund contribution.
    pub pf: Decimal,
    /// Employer provident fund contribution (not deducted).
    pub employer_pf: Decimal,
    /// Income tax withholding.
    pub tax: Decimal,
    /// Employee state insurance.
    pub esi: Decimal,
    /// Professional tax (legacy formula).
    pub professional_tax: Decimal,
    /// Sum of all deductions.
    pub total_deductions: Decimal,
    /// Net pay before attendance and leave deductions.
    pub net_before_leave_deductions: Decimal,
    /// Net pay, never negative.
    pub net: Decimal,
    /// Cost to company.
    pub ctc: Decimal,
}

/// Stateless salary calculator.
pub struct PayrollCalculator;

impl PayrollCalculator {
    const BASIC_RATE: Decimal = Decimal::from_parts(50, 0, 0, false, 2);
    const HRA_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 2);
    const BONUS_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);
    const PF_RATE: Decimal = Decimal::from_parts(12, 0, 0, false, 2);
    const TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);
    const ESI_RATE: Decimal = Decimal::from_parts(75, 0, 0, false, 4);
    const MAX_SCORE: Decimal = Decimal::TEN;

    /// Computes a breakdown with the given formula.
    ///
    /// Negative salaries are treated as zero. The result always satisfies
    /// `0 <= net <= gross`.
    #[must_use]
    pub fn compute(input: &PayrollInput, formula: FormulaVersion) -> SalaryBreakdown {
        match formula {
            FormulaVersion::Standard => Self::standard(input),
            FormulaVersion::Legacy => Self::legacy(input),
        }
    }

    fn standard(input: &PayrollInput) -> SalaryBreakdown {
        let salary = input.basic_salary.max(Decimal::ZERO);
        let score = input.office_score.clamp(Decimal::ZERO, Self::MAX_SCORE);

        let basic = round_money(salary * Self::BASIC_RATE);
        let hra = round_money(salary * Self::HRA_RATE);
        let max_bonus = round_money(salary * Self::BONUS_RATE);
        let bonus = round_money(max_bonus * score / Self::MAX_SCORE);
        let gross = round_money(basic + hra + bonus);

        let working_days = Decimal::from(input.working_days);
        let working_hours =
            Decimal::from(u64::from(input.working_days) * u64::from(input.standard_work_hours_per_day));
        let per_day_rate = if working_days.is_zero() {
            Decimal::ZERO
        } else {
            round_money(gross / working_days)
        };
        let per_hour_rate = if working_hours.is_zero() {
            Decimal::ZERO
        } else {
            round_money(gross / working_hours)
        };

        let absent_days = input.absent_days();
        let day_deduction = round_money(per_day_rate * Decimal::from(absent_days));
        let paid_leave_hour_deduction =
            round_money(per_hour_rate * Decimal::from(input.extra_paid_leave_hours));

        let pf = round_money(basic * Self::PF_RATE);
        let employer_pf = pf;
        let tax = round_money(gross * Self::TAX_RATE);
        let esi = round_money(gross * Self::ESI_RATE);

        let statutory = pf + tax + esi;
        let total_deductions =
            round_money(statutory + day_deduction + paid_leave_hour_deduction);
        let net_before_leave_deductions = round_money(gross - statutory).max(Decimal::ZERO);
        let net = round_money(gross - total_deductions).max(Decimal::ZERO);
        let ctc = round_money(gross + employer_pf);

        SalaryBreakdown {
            formula: FormulaVersion::Standard,
            basic,
            hra,
            bonus,
            gross,
            per_day_rate,
            per_hour_rate,
            absent_days,
            day_deduction,
            paid_leave_hour_deduction,
            pf,
            employer_pf,
            tax,
            esi,
            professional_tax: Decimal::ZERO,
            total_deductions,
            net_before_leave_deductions,
            net,
            ctc,
        }
    }

    fn legacy(input: &PayrollInput) -> SalaryBreakdown {
        let basic = round_money(input.basic_salary.max(Decimal::ZERO));
        let gross = basic;
        let pf = round_money(basic * Self::PF_RATE);
        let professional_tax = input
            .professional_tax_flat
            .map_or_else(|| Self::professional_tax_slab(gross), |flat| {
                round_money(flat.max(Decimal::ZERO))
            });

        let absent_days = input.absent_days();
        let divisor = Decimal::from(input.working_days.max(1));
        let per_day_rate = round_money(basic / divisor);
        let day_deduction = round_money(Decimal::from(absent_days) * basic / divisor);

        let total_deductions = round_money(pf + professional_tax + day_deduction);
        let net_before_leave_deductions =
            round_money(gross - pf - professional_tax).max(Decimal::ZERO);
        let net = round_money(gross - total_deductions).max(Decimal::ZERO);

        SalaryBreakdown {
            formula: FormulaVersion::Legacy,
            basic,
            hra: Decimal::ZERO,
            bonus: Decimal::ZERO,
            gross,
            per_day_rate,
            per_hour_rate: Decimal::ZERO,
            absent_days,
            day_deduction,
            paid_leave_hour_deduction: Decimal::ZERO,
            pf,
            employer_pf: Decimal::ZERO,
            tax: Decimal::ZERO,
            esi: Decimal::ZERO,
            professional_tax,
            total_deductions,
            net_before_leave_deductions,
            net,
            ctc: gross,
        }
    }

    /// Monthly professional tax by gross slab.
    #[must_use]
    pub fn professional_tax_slab(gross: Decimal) -> Decimal {
        if gross <= Decimal::new(15_000, 0) {
            Decimal::new(150, 0)
        } else if gross <= Decimal::new(25_000, 0) {
            Decimal::new(200, 0)
        } else {
            Decimal::new(250, 0)
        }
    }
}
