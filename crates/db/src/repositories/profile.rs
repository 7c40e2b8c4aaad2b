//! Employee profile and leave balance storage.
//!
//! Balances are one row per `(user_id, leave_type)`. Deductions go through a
//! single conditional `UPDATE` so concurrent approvals can never drive a
//! balance below zero.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use payline_core::leave::{LeaveBalances, LeaveType};

use crate::entities::{employee_profiles, leave_balances};

/// Profile repository: salaries and leave balances.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    db: DatabaseConnection,
}

impl ProfileRepository {
    /// Creates a new profile repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates or updates an employee's salary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn upsert_salary(
        &self,
        user_id: Uuid,
        basic_salary: Option<Decimal>,
    ) -> Result<employee_profiles::Model, DbErr> {
        let now = chrono::Utc::now().into();
        match employee_profiles::Entity::find_by_id(user_id).one(&self.db).await? {
            Some(existing) => {
                let mut active: employee_profiles::ActiveModel = existing.into();
                active.basic_salary = Set(basic_salary);
                active.updated_at = Set(now);
                active.update(&self.db).await
            }
            None => {
                employee_profiles::ActiveModel {
                    user_id: Set(user_id),
                    basic_salary: Set(basic_salary),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await
            }
        }
    }

    /// Profile salaries for a set of users. Users without a profile are absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn salaries_for<C>(
        conn: &C,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Option<Decimal>>, DbErr>
    where
        C: ConnectionTrait,
    {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = employee_profiles::Entity::find()
            .filter(employee_profiles::Column::UserId.is_in(user_ids.iter().copied()))
            .all(conn)
            .await?;
        Ok(rows.into_iter().map(|p| (p.user_id, p.basic_salary)).collect())
    }

    /// Reads a user's balances, provisioning default rows for missing paid types.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or insert fails.
    pub async fn balances_in<C>(conn: &C, user_id: Uuid) -> Result<LeaveBalances, DbErr>
    where
        C: ConnectionTrait,
    {
        let rows = leave_balances::Entity::find()
            .filter(leave_balances::Column::UserId.eq(user_id))
            .all(conn)
            .await?;
        let stored: Vec<LeaveType> = rows.iter().map(|r| r.leave_type.into()).collect();
        let missing = LeaveBalances::missing_types(&stored);

        if !missing.is_empty() {
            let now = chrono::Utc::now();
            let defaults = missing.iter().filter_map(|t| {
                t.default_allowance().map(|days| leave_balances::ActiveModel {
                    user_id: Set(user_id),
                    leave_type: Set((*t).into()),
                    balance: Set(days),
                    updated_at: Set(now.into()),
                })
            });
            leave_balances::Entity::insert_many(defaults)
                .on_conflict(
                    OnConflict::columns([
                        leave_balances::Column::UserId,
                        leave_balances::Column::LeaveType,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(conn)
                .await?;
            tracing::debug!(user_id = %user_id, provisioned = missing.len(), "Provisioned default leave balances");
        }

        Ok(LeaveBalances::from_stored(
            rows.into_iter().map(|r| (r.leave_type.into(), r.balance)),
        ))
    }

    /// Reads a user's balances, provisioning defaults on first access.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or insert fails.
    pub async fn balances(&self, user_id: Uuid) -> Result<LeaveBalances, DbErr> {
        Self::balances_in(&self.db, user_id).await
    }

    /// Balances for many users without writing; missing rows read as defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn balances_for<C>(
        conn: &C,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, LeaveBalances>, DbErr>
    where
        C: ConnectionTrait,
    {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = leave_balances::Entity::find()
            .filter(leave_balances::Column::UserId.is_in(user_ids.iter().copied()))
            .all(conn)
            .await?;

        let mut grouped: HashMap<Uuid, Vec<(LeaveType, i32)>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.user_id)
                .or_default()
                .push((row.leave_type.into(), row.balance));
        }
        Ok(user_ids
            .iter()
            .map(|id| {
                let stored = grouped.remove(id).unwrap_or_default();
                (*id, LeaveBalances::from_stored(stored))
            })
            .collect())
    }

    /// Atomically subtracts `days` if the balance covers it.
    ///
    /// Returns `false` when the row is missing or the balance is too low; in
    /// that case nothing was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn try_deduct<C>(
        conn: &C,
        user_id: Uuid,
        leave_type: LeaveType,
        days: i32,
    ) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = leave_balances::Entity::update_many()
            .col_expr(
                leave_balances::Column::Balance,
                Expr::col(leave_balances::Column::Balance).sub(days),
            )
            .col_expr(
                leave_balances::Column::UpdatedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(leave_balances::Column::UserId.eq(user_id))
            .filter(
                leave_balances::Column::LeaveType
                    .eq(crate::entities::sea_orm_active_enums::LeaveType::from(leave_type)),
            )
            .filter(leave_balances::Column::Balance.gte(days))
            .exec(conn)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Sets a balance to an exact value (administrative adjustment and seeding).
    ///
    /// # Errors
    ///
    /// Returns an error for UNPAID, negative values or a failed write.
    pub async fn set_balance(
        &self,
        user_id: Uuid,
        leave_type: LeaveType,
        balance: i32,
    ) -> Result<(), DbErr> {
        if !leave_type.is_paid() || balance < 0 {
            return Err(DbErr::Custom(format!(
                "invalid balance {balance} for {}",
                leave_type.as_str()
            )));
        }
        let row = leave_balances::ActiveModel {
            user_id: Set(user_id),
            leave_type: Set(leave_type.into()),
            balance: Set(balance),
            updated_at: Set(chrono::Utc::now().into()),
        };
        leave_balances::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    leave_balances::Column::UserId,
                    leave_balances::Column::LeaveType,
                ])
                .update_columns([
                    leave_balances::Column::Balance,
                    leave_balances::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }
}
