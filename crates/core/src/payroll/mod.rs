//! Payroll calculation and payrun planning.
//!
//! # Modules
//!
//! - `calculator` - Per-employee salary breakdown (standard and legacy formulas)
//! - `period` - Pay period normalization and working-day counting
//! - `run` - Payrun planning: authorization, salary resolution, payslip drafts
//! - `error` - Payroll-specific error types

pub mod calculator;
pub mod error;
pub mod period;
pub mod run;

#[cfg(test)]
mod calculator_props;

pub use calculator::{FormulaVersion, PayrollCalculator, PayrollInput, SalaryBreakdown, round_money};
pub use error::PayrollError;
pub use period::PayPeriod;
pub use run::{
    EmployeeInputs, MissingSalaryPolicy, PayrunPlan, PayrunPlanner, PayrunTotals, PayslipDraft,
    RunSettings, SalarySource, parse_date,
};
