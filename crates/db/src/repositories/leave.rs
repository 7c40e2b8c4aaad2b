//! Leave balance ledger backed by PostgreSQL.
//!
//! Every mutation first runs the pure rules in `payline_core::leave` and only
//! then touches storage. Approval runs inside one transaction: the request row
//! is locked, overlap and balance are re-checked, the balance is decremented
//! conditionally and the status is flipped. The exclusion constraint on
//! approved ranges backs up the overlap check under concurrency.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use payline_core::ActorContext;
use payline_core::audit::{AuditAction, AuditEvent, AuditSink};
use payline_core::leave::{
    LeaveAction, LeaveBalances, LeaveError, LeaveRequest, LeaveService, LeaveStatus, LeaveType,
};
use payline_shared::types::{LeaveRequestId, PageRequest, PageResponse, UserId};

use crate::entities::{leave_requests, sea_orm_active_enums as db_enums};

use super::profile::ProfileRepository;

/// Name of the exclusion constraint on approved leave ranges.
const NO_OVERLAP_CONSTRAINT: &str = "excl_leave_requests_approved_overlap";

/// Input for applying for leave.
#[derive(Debug, Clone)]
pub struct ApplyLeaveInput {
    /// Leave category.
    pub leave_type: LeaveType,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day (inclusive).
    pub end_date: NaiveDate,
    /// Optional reason.
    pub reason: Option<String>,
}

/// Filter for listing leave requests.
#[derive(Debug, Clone, Default)]
pub struct LeaveFilter {
    /// Restrict to one employee.
    pub user_id: Option<UserId>,
    /// Restrict to one status.
    pub status: Option<LeaveStatus>,
    /// Restrict to one leave type.
    pub leave_type: Option<LeaveType>,
    /// Requests ending on or after this day.
    pub start: Option<NaiveDate>,
    /// Requests starting on or before this day.
    pub end: Option<NaiveDate>,
}

/// Leave repository.
#[derive(Clone)]
pub struct LeaveRepository {
    db: DatabaseConnection,
    audit: Arc<dyn AuditSink>,
}

impl LeaveRepository {
    /// Creates a new leave repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, audit: Arc<dyn AuditSink>) -> Self {
        Self { db, audit }
    }

    /// Submits a PENDING request for the actor.
    ///
    /// # Errors
    ///
    /// - `Validation` if the range is reversed
    /// - `OverlapsApprovedLeave` if it intersects an approved request
    /// - `InsufficientBalance` if a paid balance cannot cover it
    pub async fn apply(
        &self,
        actor: &ActorContext,
        input: ApplyLeaveInput,
    ) -> Result<LeaveRequest, LeaveError> {
        let user_id = actor.id.into_inner();
        LeaveService::requested_days(input.start_date, input.end_date)?;

        let overlap =
            find_approved_overlap(&self.db, user_id, input.start_date, input.end_date, None)
                .await?;
        let balances = ProfileRepository::balances_in(&self.db, user_id)
            .await
            .map_err(db_err)?;
        let days = LeaveService::validate_apply(
            input.leave_type,
            input.start_date,
            input.end_date,
            overlap,
            &balances,
        )?;

        let now = Utc::now().into();
        let reason = input
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let model = leave_requests::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            leave_type: Set(input.leave_type.into()),
            status: Set(db_enums::LeaveStatus::Pending),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            reason: Set(reason),
            computed_days: Set(days),
            approved_by: Set(None),
            approved_at: Set(None),
            decided_by: Set(None),
            decision_reason: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        let request = to_domain(model);
        tracing::info!(
            leave_id = %request.id,
            user_id = %request.user_id,
            days,
            leave_type = request.leave_type.as_str(),
            "Leave requested"
        );
        self.audit.record(AuditEvent::new(
            actor.id,
            AuditAction::LeaveApply,
            request.id,
            json!({
                "leaveType": request.leave_type,
                "startDate": request.start_date,
                "endDate": request.end_date,
                "days": days,
            }),
        ));
        Ok(request)
    }

    /// Approves a PENDING request, deducting the balance for paid types.
    ///
    /// Nothing is written unless every check passes.
    ///
    /// # Errors
    ///
    /// - `Forbidden` unless the actor is admin, hr or payroll
    /// - `NotFound` if the request does not exist
    /// - `InvalidState` if it is not PENDING
    /// - `OverlapsApprovedLeave` if another approved request now overlaps
    /// - `InsufficientBalance` if the balance no longer covers it
    pub async fn approve(
        &self,
        actor: &ActorContext,
        id: LeaveRequestId,
    ) -> Result<LeaveRequest, LeaveError> {
        LeaveService::authorize_decision(actor)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let model = leave_requests::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(LeaveError::NotFound(id))?;
        let request = to_domain(model.clone());

        let overlap = find_approved_overlap(
            &txn,
            model.user_id,
            model.start_date,
            model.end_date,
            Some(model.id),
        )
        .await?;
        let balances = ProfileRepository::balances_in(&txn, model.user_id)
            .await
            .map_err(db_err)?;

        let action = LeaveService::approve(&request, actor, overlap, &balances)?;
        let status = db_enums::LeaveStatus::from(action.new_status());
        let LeaveAction::Approve {
            approved_by,
            approved_at,
            days,
            deducts_balance,
        } = action
        else {
            return Err(LeaveError::Database("unexpected leave action".to_string()));
        };

        if deducts_balance {
            let deducted =
                ProfileRepository::try_deduct(&txn, model.user_id, request.leave_type, days)
                    .await
                    .map_err(db_err)?;
            if !deducted {
                return Err(insufficient(&balances, request.leave_type, days));
            }
        }

        let mut active: leave_requests::ActiveModel = model.into();
        active.status = Set(status);
        active.approved_by = Set(Some(approved_by.into_inner()));
        active.approved_at = Set(Some(approved_at.into()));
        active.decided_by = Set(Some(approved_by.into_inner()));
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await.map_err(overlap_or_db_err)?;

        txn.commit().await.map_err(overlap_or_db_err)?;

        let request = to_domain(updated);
        tracing::info!(
            leave_id = %request.id,
            user_id = %request.user_id,
            approved_by = %approved_by,
            days,
            deducted = deducts_balance,
            "Leave approved"
        );
        self.audit.record(AuditEvent::new(
            actor.id,
            AuditAction::LeaveApprove,
            request.id,
            json!({ "days": days, "leaveType": request.leave_type }),
        ));
        Ok(request)
    }

    /// Rejects a PENDING request. Balances are untouched.
    ///
    /// # Errors
    ///
    /// `Forbidden`, `NotFound` or `InvalidState` as for approval.
    pub async fn reject(
        &self,
        actor: &ActorContext,
        id: LeaveRequestId,
        reason: Option<String>,
    ) -> Result<LeaveRequest, LeaveError> {
        LeaveService::authorize_decision(actor)?;
        let model = self.find_model(id).await?;
        let request = to_domain(model.clone());

        let action = LeaveService::reject(&request, actor, reason)?;
        let status = db_enums::LeaveStatus::from(action.new_status());
        let LeaveAction::Reject {
            rejected_by,
            reason,
        } = action
        else {
            return Err(LeaveError::Database("unexpected leave action".to_string()));
        };

        let updated = self
            .finish(model, status, rejected_by, reason.clone())
            .await?;
        tracing::info!(leave_id = %updated.id, rejected_by = %rejected_by, "Leave rejected");
        self.audit.record(AuditEvent::new(
            actor.id,
            AuditAction::LeaveReject,
            updated.id,
            json!({ "reason": reason }),
        ));
        Ok(updated)
    }

    /// Cancels a PENDING request on behalf of its owner or an approver.
    ///
    /// # Errors
    ///
    /// `Forbidden` for other employees, `NotFound`, or `InvalidState`.
    pub async fn cancel(
        &self,
        actor: &ActorContext,
        id: LeaveRequestId,
    ) -> Result<LeaveRequest, LeaveError> {
        let model = self.find_model(id).await?;
        let request = to_domain(model.clone());

        let action = LeaveService::cancel(&request, actor)?;
        let status = db_enums::LeaveStatus::from(action.new_status());
        let LeaveAction::Cancel { cancelled_by } = action else {
            return Err(LeaveError::Database("unexpected leave action".to_string()));
        };

        let updated = self
            .finish(model, status, cancelled_by, None)
            .await?;
        tracing::info!(leave_id = %updated.id, cancelled_by = %cancelled_by, "Leave cancelled");
        self.audit.record(AuditEvent::new(
            actor.id,
            AuditAction::LeaveCancel,
            updated.id,
            serde_json::Value::Null,
        ));
        Ok(updated)
    }

    /// Finds one request visible to the actor.
    ///
    /// # Errors
    ///
    /// `NotFound`, or `Forbidden` for another employee's request.
    pub async fn find(
        &self,
        actor: &ActorContext,
        id: LeaveRequestId,
    ) -> Result<LeaveRequest, LeaveError> {
        let request = to_domain(self.find_model(id).await?);
        if !actor.can_view_leaves_of(request.user_id) {
            return Err(LeaveError::Forbidden(
                "cannot view another employee's leave".to_string(),
            ));
        }
        Ok(request)
    }

    /// Lists requests newest first.
    ///
    /// Employees only ever see their own requests, whatever the filter says.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the query fails.
    pub async fn list(
        &self,
        actor: &ActorContext,
        filter: LeaveFilter,
        page: PageRequest,
    ) -> Result<PageResponse<LeaveRequest>, LeaveError> {
        let page = page.clamped();
        let user_scope = if actor.is_leave_approver() {
            filter.user_id
        } else {
            Some(actor.id)
        };

        let mut condition = Condition::all();
        if let Some(user_id) = user_scope {
            condition = condition.add(leave_requests::Column::UserId.eq(user_id.into_inner()));
        }
        if let Some(status) = filter.status {
            condition = condition.add(leave_requests::Column::Status.eq(db_enums::LeaveStatus::from(status)));
        }
        if let Some(leave_type) = filter.leave_type {
            condition =
                condition.add(leave_requests::Column::LeaveType.eq(db_enums::LeaveType::from(leave_type)));
        }
        if let Some(start) = filter.start {
            condition = condition.add(leave_requests::Column::EndDate.gte(start));
        }
        if let Some(end) = filter.end {
            condition = condition.add(leave_requests::Column::StartDate.lte(end));
        }

        let query = leave_requests::Entity::find().filter(condition);
        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let rows = query
            .order_by_desc(leave_requests::Column::CreatedAt)
            .order_by_desc(leave_requests::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PageResponse::new(
            rows.into_iter().map(to_domain).collect(),
            page,
            total,
        ))
    }

    /// Per-type balances for a user, provisioning defaults on first access.
    ///
    /// # Errors
    ///
    /// `Forbidden` for another employee's balances, or `Database`.
    pub async fn balances(
        &self,
        actor: &ActorContext,
        user_id: UserId,
    ) -> Result<LeaveBalances, LeaveError> {
        if !actor.can_view_leaves_of(user_id) {
            return Err(LeaveError::Forbidden(
                "cannot view another employee's balances".to_string(),
            ));
        }
        ProfileRepository::balances_in(&self.db, user_id.into_inner())
            .await
            .map_err(db_err)
    }

    async fn find_model(&self, id: LeaveRequestId) -> Result<leave_requests::Model, LeaveError> {
        leave_requests::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LeaveError::NotFound(id))
    }

    /// Moves a request to a terminal non-approved status, guarding against a
    /// concurrent transition with a status predicate.
    async fn finish(
        &self,
        model: leave_requests::Model,
        status: db_enums::LeaveStatus,
        decided_by: UserId,
        reason: Option<String>,
    ) -> Result<LeaveRequest, LeaveError> {
        let id = model.id;
        let patch = leave_requests::ActiveModel {
            status: Set(status),
            decided_by: Set(Some(decided_by.into_inner())),
            decision_reason: Set(reason),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        let result = leave_requests::Entity::update_many()
            .set(patch)
            .filter(leave_requests::Column::Id.eq(id))
            .filter(leave_requests::Column::Status.eq(db_enums::LeaveStatus::Pending))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        let current = self.find_model(LeaveRequestId::from_uuid(id)).await?;
        if result.rows_affected == 0 {
            return Err(LeaveError::InvalidState {
                status: LeaveStatus::from(current.status),
            });
        }
        Ok(to_domain(current))
    }
}

/// Finds an APPROVED request of `user_id` intersecting `[start, end]`.
async fn find_approved_overlap<C>(
    conn: &C,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
    exclude: Option<Uuid>,
) -> Result<Option<LeaveRequestId>, LeaveError>
where
    C: ConnectionTrait,
{
    let mut query = leave_requests::Entity::find()
        .filter(leave_requests::Column::UserId.eq(user_id))
        .filter(leave_requests::Column::Status.eq(db_enums::LeaveStatus::Approved))
        .filter(leave_requests::Column::StartDate.lte(end))
        .filter(leave_requests::Column::EndDate.gte(start));
    if let Some(id) = exclude {
        query = query.filter(leave_requests::Column::Id.ne(id));
    }

    let found = query.one(conn).await.map_err(db_err)?;
    Ok(found.map(|m| LeaveRequestId::from_uuid(m.id)))
}

/// Approved paid-leave ranges for many users intersecting a window.
pub(crate) async fn approved_paid_ranges<C>(
    conn: &C,
    user_ids: &[Uuid],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<(Uuid, payline_core::leave::DateRange)>, DbErr>
where
    C: ConnectionTrait,
{
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    let paid: Vec<db_enums::LeaveType> = LeaveType::PAID.iter().map(|t| (*t).into()).collect();
    let rows = leave_requests::Entity::find()
        .filter(leave_requests::Column::UserId.is_in(user_ids.iter().copied()))
        .filter(leave_requests::Column::Status.eq(db_enums::LeaveStatus::Approved))
        .filter(leave_requests::Column::LeaveType.is_in(paid))
        .filter(leave_requests::Column::StartDate.lte(end))
        .filter(leave_requests::Column::EndDate.gte(start))
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|m| {
            (
                m.user_id,
                payline_core::leave::DateRange {
                    start: m.start_date,
                    end: m.end_date,
                },
            )
        })
        .collect())
}

fn insufficient(balances: &LeaveBalances, leave_type: LeaveType, days: i32) -> LeaveError {
    let available = match balances.available(leave_type) {
        payline_core::leave::Allowance::Limited(n) => i64::from(n),
        payline_core::leave::Allowance::Unlimited => i64::MAX,
    };
    LeaveError::InsufficientBalance {
        leave_type,
        requested: i64::from(days),
        available,
    }
}

fn db_err(e: DbErr) -> LeaveError {
    LeaveError::Database(e.to_string())
}

fn overlap_or_db_err(e: DbErr) -> LeaveError {
    let message = e.to_string();
    if message.contains(NO_OVERLAP_CONSTRAINT) {
        LeaveError::OverlapsApprovedLeave {
            conflicting: "concurrent approval".to_string(),
        }
    } else {
        LeaveError::Database(message)
    }
}

fn to_domain(model: leave_requests::Model) -> LeaveRequest {
    LeaveRequest {
        id: LeaveRequestId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        leave_type: model.leave_type.into(),
        status: model.status.into(),
        start_date: model.start_date,
        end_date: model.end_date,
        reason: model.reason,
        computed_days: model.computed_days,
        approved_by: model.approved_by.map(UserId::from_uuid),
        approved_at: model.approved_at.map(|t| t.with_timezone(&Utc)),
        decided_by: model.decided_by.map(UserId::from_uuid),
        decision_reason: model.decision_reason,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
