//! Leave request routes.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use payline_core::leave::{LeaveStatus, LeaveType};
use payline_core::payroll::parse_date;
use payline_db::repositories::{ApplyLeaveInput, LeaveFilter, LeaveRepository};
use payline_shared::types::{LeaveRequestId, PageRequest, UserId};

/// Creates the leave routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leaves", post(apply_leave).get(list_leaves))
        .route("/leaves/{id}", get(get_leave))
        .route("/leaves/balances/{user_id}", get(get_balances))
        .route("/leaves/{id}/approve", put(approve_leave))
        .route("/leaves/{id}/reject", put(reject_leave))
        .route("/leaves/{id}/cancel", put(cancel_leave))
}

/// Request body for applying for leave.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyLeaveRequest {
    /// SICK, CASUAL, EARNED or UNPAID.
    #[serde(rename = "type")]
    pub leave_type: String,
    /// First day (YYYY-MM-DD or RFC 3339).
    pub start_date: String,
    /// Last day, inclusive.
    pub end_date: String,
    /// Optional reason.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Optional request body for rejecting a leave request.
#[derive(Debug, Default, Deserialize)]
pub struct RejectLeaveRequest {
    /// Why the request was rejected.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Query parameters for listing leave requests.
#[derive(Debug, Default, Deserialize)]
pub struct ListLeavesQuery {
    /// Restrict to one employee (approvers only).
    pub user_id: Option<Uuid>,
    /// Restrict to one status.
    pub status: Option<String>,
    /// Restrict to one leave type.
    #[serde(rename = "type")]
    pub leave_type: Option<String>,
    /// Window start.
    pub start: Option<String>,
    /// Window end.
    pub end: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl ListLeavesQuery {
    fn into_filter(self) -> Result<(LeaveFilter, PageRequest), ApiError> {
        let status = self
            .status
            .as_deref()
            .map(|s| {
                LeaveStatus::parse(s)
                    .ok_or_else(|| ApiError::validation(format!("unknown leave status '{s}'")))
            })
            .transpose()?;
        let leave_type = self.leave_type.as_deref().map(parse_leave_type).transpose()?;

        let defaults = PageRequest::default();
        let page = PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        };

        let filter = LeaveFilter {
            user_id: self.user_id.map(UserId::from_uuid),
            status,
            leave_type,
            start: self.start.as_deref().map(parse_day).transpose()?,
            end: self.end.as_deref().map(parse_day).transpose()?,
        };
        Ok((filter, page))
    }
}

/// Remaining paid-leave days for one employee.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancesResponse {
    /// Employee.
    pub user_id: UserId,
    /// Days left per paid type. Unpaid leave is unlimited and not listed.
    pub balances: BTreeMap<LeaveType, i32>,
    /// Sum over all paid types.
    pub total_paid: i64,
}

fn parse_day(value: &str) -> Result<NaiveDate, ApiError> {
    parse_date(value).map_err(ApiError::from)
}

fn parse_leave_type(value: &str) -> Result<LeaveType, ApiError> {
    LeaveType::parse(value)
        .ok_or_else(|| ApiError::validation(format!("unknown leave type '{value}'")))
}

fn repository(state: &AppState) -> LeaveRepository {
    LeaveRepository::new((*state.db).clone(), state.audit.clone())
}

/// POST `/leaves` - Apply for leave.
async fn apply_leave(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    payload: Result<Json<ApplyLeaveRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let input = ApplyLeaveInput {
        leave_type: parse_leave_type(&body.leave_type)?,
        start_date: parse_day(&body.start_date)?,
        end_date: parse_day(&body.end_date)?,
        reason: body.reason,
    };

    let request = repository(&state).apply(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET `/leaves` - List leave requests, newest first.
async fn list_leaves(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    query: Result<Query<ListLeavesQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let (filter, page) = query.into_filter()?;
    let requests = repository(&state).list(&actor, filter, page).await?;
    Ok(Json(requests))
}

/// GET `/leaves/{id}` - One request, if the caller may see it.
async fn get_leave(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let request = repository(&state)
        .find(&actor, LeaveRequestId::from_uuid(id))
        .await?;
    Ok(Json(request))
}

/// GET `/leaves/balances/{user_id}` - Remaining balances.
async fn get_balances(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = UserId::from_uuid(user_id);
    let balances = repository(&state).balances(&actor, user_id).await?;
    Ok(Json(BalancesResponse {
        user_id,
        total_paid: balances.total_paid(),
        balances: balances.iter().collect(),
    }))
}

/// PUT `/leaves/{id}/approve` - Approve a pending request.
async fn approve_leave(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let request = repository(&state)
        .approve(&actor, LeaveRequestId::from_uuid(id))
        .await?;
    info!(leave_id = %request.id, approver = %actor.id, "Leave approved");
    Ok(Json(request))
}

/// PUT `/leaves/{id}/reject` - Reject a pending request, optionally with a reason.
async fn reject_leave(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body = if body.is_empty() {
        RejectLeaveRequest::default()
    } else {
        serde_json::from_slice::<RejectLeaveRequest>(&body)
            .map_err(|e| ApiError::validation(e.to_string()))?
    };

    let request = repository(&state)
        .reject(&actor, LeaveRequestId::from_uuid(id), body.reason)
        .await?;
    Ok(Json(request))
}

/// PUT `/leaves/{id}/cancel` - Cancel a pending request.
async fn cancel_leave(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let request = repository(&state)
        .cancel(&actor, LeaveRequestId::from_uuid(id))
        .await?;
    Ok(Json(request))
}
