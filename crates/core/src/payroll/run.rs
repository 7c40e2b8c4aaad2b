//! Payrun planning.
//!
//! The planner turns a period plus per-employee inputs into a complete set of
//! payslip drafts. It does no I/O: the storage layer gathers the inputs in one
//! pass, asks for a plan, then writes the payrun and all payslips atomically.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::calculator::{
    FormulaVersion, MAX_AMOUNT, PayrollCalculator, PayrollInput, SalaryBreakdown,
};
use super::error::PayrollError;
use super::period::PayPeriod;
use crate::access::ActorContext;
use crate::leave::{DateRange, LeaveBalances};
use payline_shared::config::PayrollConfig;
use payline_shared::types::UserId;

/// What to do when an employee has no usable salary on record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSalaryPolicy {
    /// Use the fallback salary silently.
    UseDefault,
    /// Use the fallback salary and flag it.
    #[default]
    Warn,
    /// Abort the whole run.
    Fail,
}

impl MissingSalaryPolicy {
    /// Parses a configured policy name.
    pub fn parse(value: &str) -> Result<Self, PayrollError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" | "use_default" => Ok(Self::UseDefault),
            "warn" => Ok(Self::Warn),
            "fail" => Ok(Self::Fail),
            other => Err(PayrollError::Validation(format!(
                "unknown missing salary policy '{other}'"
            ))),
        }
    }

    /// Returns true if fallbacks should be logged.
    #[must_use]
    pub const fn should_warn(self) -> bool {
        matches!(self, Self::Warn)
    }
}

/// Run-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Formula applied to every employee in the run.
    pub formula: FormulaVersion,
    /// Salary used when a profile has none.
    pub fallback_basic_salary: Decimal,
    /// Missing salary handling.
    pub missing_salary: MissingSalaryPolicy,
    /// Hours in a standard working day.
    pub standard_work_hours_per_day: u32,
}

impl RunSettings {
    /// Builds settings from the `[payroll]` configuration section.
    pub fn from_config(config: &PayrollConfig) -> Result<Self, PayrollError> {
        let fallback_basic_salary = Decimal::from(config.fallback_basic_salary);
        if fallback_basic_salary > MAX_AMOUNT {
            return Err(PayrollError::Validation(format!(
                "fallback_basic_salary {fallback_basic_salary} exceeds {MAX_AMOUNT}"
            )));
        }
        Ok(Self {
            formula: FormulaVersion::parse(&config.formula)?,
            fallback_basic_salary,
            missing_salary: MissingSalaryPolicy::parse(&config.missing_salary)?,
            standard_work_hours_per_day: config.standard_work_hours_per_day,
        })
    }

    /// Returns a copy using `formula` instead of the configured one.
    #[must_use]
    pub fn with_formula(&self, formula: FormulaVersion) -> Self {
        Self {
            formula,
            ..self.clone()
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            formula: FormulaVersion::default(),
            fallback_basic_salary: Decimal::new(30_000, 0),
            missing_salary: MissingSalaryPolicy::default(),
            standard_work_hours_per_day: 8,
        }
    }
}

/// Where an employee's salary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalarySource {
    /// The employee profile.
    Profile,
    /// The configured fallback.
    Fallback,
}

/// Everything the planner needs for one employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeInputs {
    /// Employee.
    pub user_id: UserId,
    /// Salary from the profile, if any.
    pub basic_salary: Option<Decimal>,
    /// Days with a check-in inside the period.
    pub present_days: u32,
    /// Paid-leave hours beyond the allowance.
    pub extra_paid_leave_hours: u32,
    /// Performance score; 10 when unknown.
    pub office_score: Option<Decimal>,
}

/// A computed payslip awaiting persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayslipDraft {
    /// Employee.
    pub user_id: UserId,
    /// Salary the computation used.
    pub salary: Decimal,
    /// Origin of that salary.
    pub salary_source: SalarySource,
    /// Days present.
    pub present_days: u32,
    /// Extra paid-leave hours charged.
    pub extra_paid_leave_hours: u32,
    /// Full breakdown.
    pub breakdown: SalaryBreakdown,
}

impl PayslipDraft {
    /// Gross pay.
    #[must_use]
    pub fn gross(&self) -> Decimal {
        self.breakdown.gross
    }

    /// Net pay.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.breakdown.net
    }

    /// Components document stored with the payslip.
    #[must_use]
    pub fn components_json(&self, working_days: u32) -> serde_json::Value {
        let mut components = serde_json::to_value(&self.breakdown).unwrap_or_else(|_| json!({}));
        if let Some(map) = components.as_object_mut() {
            map.insert("formula".into(), json!(self.breakdown.formula.tag()));
            map.insert("salary".into(), json!(self.salary));
            map.insert("salarySource".into(), json!(self.salary_source));
            map.insert("presentDays".into(), json!(self.present_days));
            map.insert("workingDays".into(), json!(working_days));
            map.insert("extraPaidLeaveHours".into(), json!(self.extra_paid_leave_hours));
        }
        components
    }
}

/// Aggregate figures for a payrun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrunTotals {
    /// Number of payslips.
    pub employee_count: usize,
    /// Sum of gross pay.
    pub total_gross: Decimal,
    /// Sum of net pay.
    pub total_net: Decimal,
}

impl PayrunTotals {
    /// Sums `(gross, net)` pairs.
    #[must_use]
    pub fn from_amounts<I>(amounts: I) -> Self
    where
        I: IntoIterator<Item = (Decimal, Decimal)>,
    {
        amounts
            .into_iter()
            .fold(Self::default(), |acc, (gross, net)| Self {
                employee_count: acc.employee_count + 1,
                total_gross: acc.total_gross + gross,
                total_net: acc.total_net + net,
            })
    }
}

/// A fully computed payrun.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrunPlan {
    /// Covered period.
    pub period: PayPeriod,
    /// Formula used for every payslip.
    pub formula: FormulaVersion,
    /// Weekdays in the period.
    pub working_days: u32,
    /// One draft per eligible employee.
    pub payslips: Vec<PayslipDraft>,
}

impl PayrunPlan {
    /// Calendar year key.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.period.year()
    }

    /// Calendar month key.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.period.month()
    }

    /// Metadata document stored with the payrun.
    #[must_use]
    pub fn metadata_json(&self) -> serde_json::Value {
        json!({
            "periodStart": self.period.start,
            "periodEnd": self.period.end,
            "workingDays": self.working_days,
            "formula": self.formula.tag(),
            "employeeCount": self.payslips.len(),
        })
    }

    /// Sums over all drafts.
    #[must_use]
    pub fn totals(&self) -> PayrunTotals {
        PayrunTotals::from_amounts(self.payslips.iter().map(|p| (p.gross(), p.net())))
    }

    /// Employees whose salary came from the fallback.
    pub fn fallback_employees(&self) -> impl Iterator<Item = UserId> + '_ {
        self.payslips
            .iter()
            .filter(|p| p.salary_source == SalarySource::Fallback)
            .map(|p| p.user_id)
    }
}

/// Stateless payrun planner.
pub struct PayrunPlanner;

impl PayrunPlanner {
    /// Only admin and payroll roles may run payroll.
    pub fn authorize(actor: &ActorContext) -> Result<(), PayrollError> {
        if actor.is_payroll_operator() {
            Ok(())
        } else {
            Err(PayrollError::Forbidden(format!(
                "role '{}' cannot run payroll",
                actor.role
            )))
        }
    }

    /// Hours of approved paid leave in the period beyond the allowance.
    ///
    /// Each leave is clipped to the period before counting. The allowance is
    /// the sum of the employee's remaining paid balances.
    #[must_use]
    pub fn extra_paid_leave_hours(
        period: &PayPeriod,
        approved_paid_leaves: &[DateRange],
        balances: &LeaveBalances,
        hours_per_day: u32,
    ) -> u32 {
        let bounds = period.as_range();
        let taken: i64 = approved_paid_leaves
            .iter()
            .filter_map(|leave| leave.clip_to(&bounds))
            .map(|clipped| clipped.inclusive_days())
            .sum();
        let excess = (taken - balances.total_paid()).max(0);
        let hours = excess.saturating_mul(i64::from(hours_per_day));
        u32::try_from(hours).unwrap_or(u32::MAX)
    }

    /// Chooses the salary for an employee according to the policy.
    ///
    /// A missing or non-positive profile salary counts as missing.
    pub fn resolve_salary(
        user_id: UserId,
        profile_salary: Option<Decimal>,
        settings: &RunSettings,
    ) -> Result<(Decimal, SalarySource), PayrollError> {
        match profile_salary {
            Some(salary) if salary > Decimal::ZERO => Ok((salary, SalarySource::Profile)),
            _ if settings.missing_salary == MissingSalaryPolicy::Fail => {
                Err(PayrollError::MissingSalary { user_id })
            }
            _ => Ok((settings.fallback_basic_salary, SalarySource::Fallback)),
        }
    }

    /// Computes every payslip for the period.
    ///
    /// Fails as a whole if any employee's salary cannot be resolved.
    pub fn plan(
        period: PayPeriod,
        employees: &[EmployeeInputs],
        settings: &RunSettings,
    ) -> Result<PayrunPlan, PayrollError> {
        let working_days = period.working_days();
        let payslips = employees
            .iter()
            .map(|employee| Self::draft(employee, working_days, settings))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PayrunPlan {
            period,
            formula: settings.formula,
            working_days,
            payslips,
        })
    }

    fn draft(
        employee: &EmployeeInputs,
        working_days: u32,
        settings: &RunSettings,
    ) -> Result<PayslipDraft, PayrollError> {
        let (salary, salary_source) =
            Self::resolve_salary(employee.user_id, employee.basic_salary, settings)?;
        let input = PayrollInput {
            basic_salary: salary,
            office_score: employee.office_score.unwrap_or(Decimal::TEN),
            present_days: employee.present_days,
            working_days,
            extra_paid_leave_hours: employee.extra_paid_leave_hours,
            standard_work_hours_per_day: settings.standard_work_hours_per_day,
            professional_tax_flat: None,
        };
        input.validate()?;
        let breakdown = PayrollCalculator::compute(&input, settings.formula);

        Ok(PayslipDraft {
            user_id: employee.user_id,
            salary,
            salary_source,
            present_days: employee.present_days,
            extra_paid_leave_hours: employee.extra_paid_leave_hours,
            breakdown,
        })
    }
}

/// Parses `YYYY-MM-DD` or an RFC 3339 timestamp, truncating the latter to
/// its UTC date.
pub fn parse_date(value: &str) -> Result<NaiveDate, PayrollError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| {
            DateTime::parse_from_rfc3339(trimmed).map(|t| t.with_timezone(&Utc).date_naive())
        })
        .map_err(|_| PayrollError::Validation(format!("invalid date '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Role;
    use crate::leave::LeaveType;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn march() -> PayPeriod {
        PayPeriod::calendar_month(2025, 3).unwrap()
    }

    fn employee(salary: Option<Decimal>, present_days: u32) -> EmployeeInputs {
        EmployeeInputs {
            user_id: UserId::new(),
            basic_salary: salary,
            present_days,
            extra_paid_leave_hours: 0,
            office_score: None,
        }
    }

    #[rstest]
    #[case(Role::Admin, true)]
    #[case(Role::Payroll, true)]
    #[case(Role::Hr, false)]
    #[case(Role::Employee, false)]
    fn test_authorize(#[case] role: Role, #[case] allowed: bool) {
        let actor = ActorContext::new(UserId::new(), role);
        assert_eq!(PayrunPlanner::authorize(&actor).is_ok(), allowed);
    }

    #[test]
    fn test_resolve_salary_prefers_profile() {
        let settings = RunSettings::default();
        let (salary, source) =
            PayrunPlanner::resolve_salary(UserId::new(), Some(dec!(45000)), &settings).unwrap();
        assert_eq!(salary, dec!(45000));
        assert_eq!(source, SalarySource::Profile);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(dec!(0)))]
    #[case(Some(dec!(-5)))]
    fn test_resolve_salary_falls_back(#[case] profile: Option<Decimal>) {
        let settings = RunSettings::default();
        let (salary, source) =
            PayrunPlanner::resolve_salary(UserId::new(), profile, &settings).unwrap();
        assert_eq!(salary, dec!(30000));
        assert_eq!(source, SalarySource::Fallback);
    }

    #[test]
    fn test_resolve_salary_fail_policy() {
        let settings = RunSettings {
            missing_salary: MissingSalaryPolicy::Fail,
            ..RunSettings::default()
        };
        let user_id = UserId::new();
        let err = PayrunPlanner::resolve_salary(user_id, None, &settings).unwrap_err();
        assert!(matches!(err, PayrollError::MissingSalary { user_id: id } if id == user_id));
    }

    #[test]
    fn test_plan_fail_policy_aborts_whole_run() {
        let settings = RunSettings {
            missing_salary: MissingSalaryPolicy::Fail,
            ..RunSettings::default()
        };
        let employees = vec![employee(Some(dec!(40000)), 21), employee(None, 21)];
        let result = PayrunPlanner::plan(march(), &employees, &settings);
        assert!(matches!(result, Err(PayrollError::MissingSalary { .. })));
    }

    #[test]
    fn test_plan_computes_every_employee() {
        let employees = vec![
            employee(Some(dec!(30000)), 21),
            employee(Some(dec!(60000)), 19),
            employee(None, 21),
        ];
        let plan = PayrunPlanner::plan(march(), &employees, &RunSettings::default()).unwrap();

        assert_eq!(plan.year(), 2025);
        assert_eq!(plan.month(), 3);
        assert_eq!(plan.working_days, 21);
        assert_eq!(plan.payslips.len(), 3);
        assert_eq!(plan.fallback_employees().count(), 1);
        for slip in &plan.payslips {
            assert!(slip.net() >= Decimal::ZERO);
            assert!(slip.net() <= slip.gross());
            assert_eq!(slip.breakdown.formula, FormulaVersion::Standard);
        }

        let totals = plan.totals();
        assert_eq!(totals.employee_count, 3);
        assert_eq!(totals.total_gross, dec!(24000) + dec!(48000) + dec!(24000));
    }

    #[test]
    fn test_plan_with_no_employees() {
        let plan = PayrunPlanner::plan(march(), &[], &RunSettings::default()).unwrap();
        assert!(plan.payslips.is_empty());
        assert_eq!(plan.totals(), PayrunTotals::default());
        assert_eq!(plan.metadata_json()["employeeCount"], 0);
    }

    #[test]
    fn test_metadata_json() {
        let settings = RunSettings {
            formula: FormulaVersion::Legacy,
            ..RunSettings::default()
        };
        let plan = PayrunPlanner::plan(march(), &[employee(Some(dec!(30000)), 21)], &settings)
            .unwrap();
        let meta = plan.metadata_json();
        assert_eq!(meta["periodStart"], "2025-03-01");
        assert_eq!(meta["periodEnd"], "2025-03-31");
        assert_eq!(meta["workingDays"], 21);
        assert_eq!(meta["formula"], "legacy-v1");
        assert_eq!(meta["employeeCount"], 1);
    }

    #[test]
    fn test_components_json_records_source_and_formula() {
        let plan =
            PayrunPlanner::plan(march(), &[employee(None, 20)], &RunSettings::default()).unwrap();
        let components = plan.payslips[0].components_json(plan.working_days);
        assert_eq!(components["formula"], "standard-v2");
        assert_eq!(components["salarySource"], "fallback");
        assert_eq!(components["presentDays"], 20);
        assert_eq!(components["workingDays"], 21);
        assert!(components.get("net").is_some());
    }

    #[test]
    fn test_extra_hours_within_allowance() {
        let balances = LeaveBalances::with_defaults();
        let leaves = [DateRange::new(d(2025, 3, 3), d(2025, 3, 7)).unwrap()];
        assert_eq!(
            PayrunPlanner::extra_paid_leave_hours(&march(), &leaves, &balances, 8),
            0
        );
    }

    #[test]
    fn test_extra_hours_beyond_allowance_are_clipped_to_period() {
        let balances = LeaveBalances::from_stored([
            (LeaveType::Sick, 0),
            (LeaveType::Casual, 1),
            (LeaveType::Earned, 0),
        ]);
        // Two days fall in February and are not counted.
        let leaves = [
            DateRange::new(d(2025, 2, 27), d(2025, 3, 3)).unwrap(),
            DateRange::new(d(2025, 3, 10), d(2025, 3, 10)).unwrap(),
        ];
        // 3 + 1 days in March, minus 1 day of allowance.
        assert_eq!(
            PayrunPlanner::extra_paid_leave_hours(&march(), &leaves, &balances, 8),
            24
        );
    }

    #[test]
    fn test_leave_outside_period_ignored() {
        let balances = LeaveBalances::from_stored([
            (LeaveType::Sick, 0),
            (LeaveType::Casual, 0),
            (LeaveType::Earned, 0),
        ]);
        let leaves = [DateRange::new(d(2025, 4, 1), d(2025, 4, 5)).unwrap()];
        assert_eq!(
            PayrunPlanner::extra_paid_leave_hours(&march(), &leaves, &balances, 8),
            0
        );
    }

    #[rstest]
    #[case("default", MissingSalaryPolicy::UseDefault)]
    #[case("WARN", MissingSalaryPolicy::Warn)]
    #[case("fail", MissingSalaryPolicy::Fail)]
    fn test_policy_parse(#[case] raw: &str, #[case] expected: MissingSalaryPolicy) {
        assert_eq!(MissingSalaryPolicy::parse(raw).unwrap(), expected);
    }

    #[test]
    fn test_policy_parse_unknown() {
        assert!(MissingSalaryPolicy::parse("panic").is_err());
    }

    #[test]
    fn test_settings_from_config() {
        let config = PayrollConfig {
            formula: "legacy".to_string(),
            fallback_basic_salary: 25_000,
            missing_salary: "fail".to_string(),
            standard_work_hours_per_day: 9,
        };
        let settings = RunSettings::from_config(&config).unwrap();
        assert_eq!(settings.formula, FormulaVersion::Legacy);
        assert_eq!(settings.fallback_basic_salary, dec!(25000));
        assert_eq!(settings.missing_salary, MissingSalaryPolicy::Fail);
        assert_eq!(settings.standard_work_hours_per_day, 9);
        assert_eq!(
            settings.with_formula(FormulaVersion::Standard).formula,
            FormulaVersion::Standard
        );
    }

    #[test]
    fn test_settings_reject_fallback_salary_over_column_limit() {
        let config = PayrollConfig {
            fallback_basic_salary: u64::MAX,
            ..PayrollConfig::default()
        };
        assert!(matches!(
            RunSettings::from_config(&config),
            Err(PayrollError::Validation(_))
        ));
    }

    #[test]
    fn test_settings_from_default_config_match_defaults() {
        let settings = RunSettings::from_config(&PayrollConfig::default()).unwrap();
        assert_eq!(settings, RunSettings::default());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-03-01").unwrap(), d(2025, 3, 1));
        assert_eq!(parse_date("2025-03-01T23:30:00-02:00").unwrap(), d(2025, 3, 2));
        assert!(matches!(parse_date("03/01/2025"), Err(PayrollError::Validation(_))));
    }
}
