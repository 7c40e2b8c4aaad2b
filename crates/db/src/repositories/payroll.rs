//! Payroll run orchestration.
//!
//! A run gathers inputs for every eligible employee inside one transaction,
//! computes all payslips in memory, then inserts the payrun and every payslip
//! before committing. Any failure rolls the whole batch back. The
//! `UNIQUE (year, month)` constraint is the authoritative guard against a
//! second run for the same month; the pre-check only fails fast.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use payline_core::ActorContext;
use payline_core::audit::{AuditAction, AuditEvent, AuditSink};
use payline_core::leave::DateRange;
use payline_core::payroll::{
    EmployeeInputs, PayPeriod, PayrollError, PayrunPlanner, PayrunTotals, RunSettings,
};
use payline_shared::types::{PageRequest, PageResponse, PayrunId, PayslipId, UserId};

use crate::entities::{payruns, payslips};

use super::attendance::AttendanceRepository;
use super::leave::approved_paid_ranges;
use super::profile::ProfileRepository;
use super::user::UserRepository;

/// A stored payrun.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrunRecord {
    /// Payrun id.
    pub id: PayrunId,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: i32,
    /// Period, working days, formula and employee count.
    pub metadata: Value,
    /// Operator who ran it.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A stored payslip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayslipRecord {
    /// Payslip id.
    pub id: PayslipId,
    /// Owning payrun.
    pub payrun_id: PayrunId,
    /// Employee.
    pub user_id: UserId,
    /// Gross pay.
    pub gross: Decimal,
    /// Net pay.
    pub net: Decimal,
    /// Full salary breakdown.
    pub components: Value,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A payslip with the month it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayslip {
    /// The payslip.
    #[serde(flatten)]
    pub payslip: PayslipRecord,
    /// Payrun year.
    pub year: i32,
    /// Payrun month.
    pub month: i32,
}

/// A payrun with its payslips and totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrunDetail {
    /// The payrun.
    pub payrun: PayrunRecord,
    /// All payslips.
    pub payslips: Vec<PayslipRecord>,
    /// Sums over the payslips.
    pub totals: PayrunTotals,
}

/// Payroll repository.
#[derive(Clone)]
pub struct PayrollRepository {
    db: DatabaseConnection,
    audit: Arc<dyn AuditSink>,
}

impl PayrollRepository {
    /// Creates a new payroll repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, audit: Arc<dyn AuditSink>) -> Self {
        Self { db, audit }
    }

    /// Runs payroll for the period.
    ///
    /// # Errors
    ///
    /// - `Forbidden` unless the actor is admin or payroll
    /// - `DuplicatePayrun` if the calendar month already has a payrun
    /// - `MissingSalary` under the fail policy
    /// - `Database` for storage failures; nothing is persisted
    pub async fn run(
        &self,
        actor: &ActorContext,
        period: PayPeriod,
        settings: &RunSettings,
    ) -> Result<PayrunDetail, PayrollError> {
        PayrunPlanner::authorize(actor)?;
        let year = period.year();
        let month = period.month();
        let month_i32 = i32::try_from(month)
            .map_err(|_| PayrollError::Validation(format!("invalid month {month}")))?;

        if self.find_by_month(year, month_i32).await?.is_some() {
            return Err(PayrollError::DuplicatePayrun { year, month });
        }

        let txn = self.db.begin().await.map_err(db_err)?;

        let employees = UserRepository::list_active_employees(&txn)
            .await
            .map_err(db_err)?;
        let user_ids: Vec<Uuid> = employees.iter().map(|u| u.id).collect();

        let salaries = ProfileRepository::salaries_for(&txn, &user_ids)
            .await
            .map_err(db_err)?;
        let present = AttendanceRepository::present_days(&txn, &user_ids, &period)
            .await
            .map_err(db_err)?;
        let balances = ProfileRepository::balances_for(&txn, &user_ids)
            .await
            .map_err(db_err)?;
        let leaves = approved_paid_ranges(&txn, &user_ids, period.start, period.end)
            .await
            .map_err(db_err)?;

        let inputs: Vec<EmployeeInputs> = user_ids
            .iter()
            .map(|id| {
                let own_leaves: Vec<DateRange> = leaves
                    .iter()
                    .filter(|(user_id, _)| user_id == id)
                    .map(|(_, range)| *range)
                    .collect();
                let extra_paid_leave_hours = balances.get(id).map_or(0, |b| {
                    PayrunPlanner::extra_paid_leave_hours(
                        &period,
                        &own_leaves,
                        b,
                        settings.standard_work_hours_per_day,
                    )
                });
                EmployeeInputs {
                    user_id: UserId::from_uuid(*id),
                    basic_salary: salaries.get(id).copied().flatten(),
                    present_days: present.get(id).copied().unwrap_or(0),
                    extra_paid_leave_hours,
                    office_score: None,
                }
            })
            .collect();

        let plan = PayrunPlanner::plan(period, &inputs, settings)?;
        if settings.missing_salary.should_warn() {
            for user_id in plan.fallback_employees() {
                tracing::warn!(
                    user_id = %user_id,
                    fallback = %settings.fallback_basic_salary,
                    "Employee has no salary on record, using fallback"
                );
            }
        }

        let now = Utc::now();
        let payrun = payruns::ActiveModel {
            id: Set(Uuid::now_v7()),
            year: Set(year),
            month: Set(month_i32),
            metadata: Set(plan.metadata_json()),
            created_by: Set(actor.id.into_inner()),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| duplicate_or_db_err(e, year, month))?;
        let payrun_id = payrun.id;

        let rows: Vec<payslips::ActiveModel> = plan
            .payslips
            .iter()
            .map(|draft| {
                tracing::debug!(
                    user_id = %draft.user_id,
                    gross = %draft.gross(),
                    net = %draft.net(),
                    present_days = draft.present_days,
                    "Computed payslip"
                );
                payslips::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    payrun_id: Set(payrun_id),
                    user_id: Set(draft.user_id.into_inner()),
                    gross: Set(draft.gross()),
                    net: Set(draft.net()),
                    components: Set(draft.components_json(plan.working_days)),
                    created_at: Set(now.into()),
                }
            })
            .collect();
        if !rows.is_empty() {
            payslips::Entity::insert_many(rows)
                .exec_without_returning(&txn)
                .await
                .map_err(db_err)?;
        }

        txn.commit()
            .await
            .map_err(|e| duplicate_or_db_err(e, year, month))?;

        let totals = plan.totals();
        tracing::info!(
            payrun_id = %payrun_id,
            year,
            month,
            formula = plan.formula.tag(),
            employees = totals.employee_count,
            total_net = %totals.total_net,
            "Payroll run committed"
        );
        self.audit.record(AuditEvent::new(
            actor.id,
            AuditAction::PayrollRun,
            payrun_id,
            json!({
                "year": year,
                "month": month,
                "formula": plan.formula.tag(),
                "employeeCount": totals.employee_count,
            }),
        ));

        self.load_detail(PayrunId::from_uuid(payrun_id)).await
    }

    /// Loads a payrun with its payslips and totals (admin/payroll only).
    ///
    /// # Errors
    ///
    /// `Forbidden`, `PayrunNotFound` or `Database`.
    pub async fn get(
        &self,
        actor: &ActorContext,
        id: PayrunId,
    ) -> Result<PayrunDetail, PayrollError> {
        PayrunPlanner::authorize(actor)?;
        self.load_detail(id).await
    }

    /// Lists payruns newest first (admin/payroll only).
    ///
    /// # Errors
    ///
    /// `Forbidden` or `Database`.
    pub async fn list_payruns(
        &self,
        actor: &ActorContext,
        page: PageRequest,
    ) -> Result<PageResponse<PayrunRecord>, PayrollError> {
        PayrunPlanner::authorize(actor)?;
        let page = page.clamped();

        let total = payruns::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err)?;
        let rows = payruns::Entity::find()
            .order_by_desc(payruns::Column::Year)
            .order_by_desc(payruns::Column::Month)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PageResponse::new(
            rows.into_iter().map(payrun_record).collect(),
            page,
            total,
        ))
    }

    /// Payslips of one employee, newest first (owner or admin/payroll).
    ///
    /// # Errors
    ///
    /// `Forbidden` or `Database`.
    pub async fn payslips_for_user(
        &self,
        actor: &ActorContext,
        user_id: UserId,
    ) -> Result<Vec<EmployeePayslip>, PayrollError> {
        if !actor.can_view_payslips_of(user_id) {
            return Err(PayrollError::Forbidden(
                "cannot view another employee's payslips".to_string(),
            ));
        }

        let rows = payslips::Entity::find()
            .filter(payslips::Column::UserId.eq(user_id.into_inner()))
            .find_also_related(payruns::Entity)
            .order_by_desc(payslips::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(slip, run)| {
                run.map(|run| EmployeePayslip {
                    payslip: payslip_record(slip),
                    year: run.year,
                    month: run.month,
                })
            })
            .collect())
    }

    async fn find_by_month(
        &self,
        year: i32,
        month: i32,
    ) -> Result<Option<payruns::Model>, PayrollError> {
        payruns::Entity::find()
            .filter(payruns::Column::Year.eq(year))
            .filter(payruns::Column::Month.eq(month))
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    async fn load_detail(&self, id: PayrunId) -> Result<PayrunDetail, PayrollError> {
        let payrun = payruns::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(PayrollError::PayrunNotFound(id))?;

        let slips = payslips::Entity::find()
            .filter(payslips::Column::PayrunId.eq(payrun.id))
            .order_by_asc(payslips::Column::UserId)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let payslips: Vec<PayslipRecord> = slips.into_iter().map(payslip_record).collect();
        let totals = PayrunTotals::from_amounts(payslips.iter().map(|p| (p.gross, p.net)));

        Ok(PayrunDetail {
            payrun: payrun_record(payrun),
            payslips,
            totals,
        })
    }
}

fn payrun_record(model: payruns::Model) -> PayrunRecord {
    PayrunRecord {
        id: PayrunId::from_uuid(model.id),
        year: model.year,
        month: model.month,
        metadata: model.metadata,
        created_by: UserId::from_uuid(model.created_by),
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn payslip_record(model: payslips::Model) -> PayslipRecord {
    PayslipRecord {
        id: PayslipId::from_uuid(model.id),
        payrun_id: PayrunId::from_uuid(model.payrun_id),
        user_id: UserId::from_uuid(model.user_id),
        gross: model.gross,
        net: model.net,
        components: model.components,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn db_err(e: DbErr) -> PayrollError {
    PayrollError::Database(e.to_string())
}

fn duplicate_or_db_err(e: DbErr, year: i32, month: u32) -> PayrollError {
    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        PayrollError::DuplicatePayrun { year, month }
    } else {
        db_err(e)
    }
}
