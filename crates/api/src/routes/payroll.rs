//! Payroll routes: runs, payslips and calculator previews.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use payline_core::ActorContext;
use payline_core::payroll::{
    FormulaVersion, PayPeriod, PayrollCalculator, PayrollInput, PayrunPlanner, RunSettings,
    parse_date,
};
use payline_db::repositories::PayrollRepository;
use payline_shared::types::{PageRequest, PayrunId, UserId};

/// Creates the payroll routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payroll/run", post(run_payroll))
        .route("/payroll/runs", get(list_payruns))
        .route("/payroll/runs/{id}", get(get_payrun))
        .route("/payroll/payslips/me", get(my_payslips))
        .route("/payroll/payslips/{user_id}", get(user_payslips))
        .route("/payroll/preview", post(preview))
}

/// Request body for running payroll.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPayrollRequest {
    /// First day of the period.
    pub period_start: String,
    /// Last day of the period, inclusive.
    pub period_end: String,
    /// Overrides the configured formula for this run.
    #[serde(default)]
    pub formula: Option<String>,
}

/// Request body for a calculator preview.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    /// Calculator inputs.
    #[serde(flatten)]
    pub input: PayrollInput,
    /// Formula to use instead of the configured one.
    #[serde(default)]
    pub formula: Option<String>,
}

fn repository(state: &AppState) -> PayrollRepository {
    PayrollRepository::new((*state.db).clone(), state.audit.clone())
}

fn cache_key(id: PayrunId) -> String {
    format!("payrun:{id}")
}

fn settings_for(state: &AppState, formula: Option<&str>) -> Result<RunSettings, ApiError> {
    match formula {
        Some(name) => Ok(state
            .run_settings
            .with_formula(FormulaVersion::parse(name)?)),
        None => Ok((*state.run_settings).clone()),
    }
}

fn page_request(query: Result<Query<PageRequest>, QueryRejection>) -> Result<PageRequest, ApiError> {
    let Query(page) = query?;
    Ok(page)
}

/// POST `/payroll/run` - Compute and persist payslips for a calendar month.
async fn run_payroll(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    payload: Result<Json<RunPayrollRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    PayrunPlanner::authorize(&actor)?;
    let Json(body) = payload?;

    let period = PayPeriod::new(
        parse_date(&body.period_start)?,
        parse_date(&body.period_end)?,
    )?;
    let settings = settings_for(&state, body.formula.as_deref())?;

    let detail = repository(&state).run(&actor, period, &settings).await?;
    info!(
        payrun_id = %detail.payrun.id,
        employees = detail.totals.employee_count,
        "Payroll run completed"
    );

    match serde_json::to_value(&detail) {
        Ok(value) => state.payrun_cache.insert(cache_key(detail.payrun.id), value),
        Err(e) => warn!(error = %e, "Failed to cache payrun"),
    }

    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET `/payroll/runs` - List payruns, newest first.
async fn list_payruns(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    query: Result<Query<PageRequest>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let page = page_request(query)?;
    let runs = repository(&state).list_payruns(&actor, page).await?;
    Ok(Json(runs))
}

/// GET `/payroll/runs/{id}` - Payrun with payslips and totals.
async fn get_payrun(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    PayrunPlanner::authorize(&actor)?;
    let id = PayrunId::from_uuid(id);
    let key = cache_key(id);

    if let Some(cached) = state.payrun_cache.get(&key) {
        debug!(payrun_id = %id, "Payrun served from cache");
        return Ok(Json(cached));
    }

    let detail = repository(&state).get(&actor, id).await?;
    let value = serde_json::to_value(&detail)
        .map_err(|e| ApiError::from(payline_shared::AppError::Internal(e.to_string())))?;
    state.payrun_cache.insert(key, value.clone());
    Ok(Json(value))
}

async fn payslips_of(
    state: &AppState,
    actor: &ActorContext,
    user_id: UserId,
) -> Result<Json<serde_json::Value>, ApiError> {
    let payslips = repository(state).payslips_for_user(actor, user_id).await?;
    Ok(Json(json!({ "data": payslips })))
}

/// GET `/payroll/payslips/me` - The caller's own payslips.
async fn my_payslips(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    payslips_of(&state, &actor, actor.id).await
}

/// GET `/payroll/payslips/{user_id}` - Payslips of one employee.
async fn user_payslips(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    payslips_of(&state, &actor, UserId::from_uuid(user_id)).await
}

/// POST `/payroll/preview` - Compute a breakdown without persisting anything.
async fn preview(
    State(state): State<AppState>,
    AuthUser(_actor): AuthUser,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    body.input.validate()?;
    let formula = match body.formula.as_deref() {
        Some(name) => FormulaVersion::parse(name)?,
        None => state.run_settings.formula,
    };
    Ok(Json(PayrollCalculator::compute(&body.input, formula)))
}
