//! Attendance aggregation.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, Set,
};
use uuid::Uuid;

use payline_core::payroll::PayPeriod;

use crate::entities::attendance;

/// Attendance repository.
#[derive(Debug, Clone)]
pub struct AttendanceRepository {
    db: DatabaseConnection,
}

impl AttendanceRepository {
    /// Creates a new attendance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a check-in for a day, replacing an earlier one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn record_check_in(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        check_in: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        let row = attendance::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            date: Set(date),
            check_in: Set(Some(check_in.into())),
            check_out: Set(None),
            created_at: Set(Utc::now().into()),
        };
        attendance::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([attendance::Column::UserId, attendance::Column::Date])
                    .update_column(attendance::Column::CheckIn)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    /// Days with a check-in inside the period, per user.
    ///
    /// Users without attendance are absent from the map.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn present_days<C>(
        conn: &C,
        user_ids: &[Uuid],
        period: &PayPeriod,
    ) -> Result<HashMap<Uuid, u32>, DbErr>
    where
        C: ConnectionTrait,
    {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let counts: Vec<(Uuid, i64)> = attendance::Entity::find()
            .select_only()
            .column(attendance::Column::UserId)
            .column_as(Expr::col(attendance::Column::Id).count(), "present_days")
            .filter(attendance::Column::UserId.is_in(user_ids.iter().copied()))
            .filter(attendance::Column::Date.between(period.start, period.end))
            .filter(attendance::Column::CheckIn.is_not_null())
            .group_by(attendance::Column::UserId)
            .into_tuple()
            .all(conn)
            .await?;

        Ok(counts
            .into_iter()
            .map(|(user_id, days)| (user_id, u32::try_from(days).unwrap_or(u32::MAX)))
            .collect())
    }
}
