//! Financial year lifecycle routes.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use steward_core::{auth::UserRole, fiscal::ResetCounts};
use steward_db::{FinancialYearRepository, entities::financial_years};
use steward_shared::AppError;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, response::ApiResult};

/// Creates the financial year routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/financial-years", get(list_financial_years))
        .route("/financial-years/current", get(get_current))
        .route("/financial-years/next", post(start_next))
        .route("/financial-years/{id}/current", post(set_current))
        .route(
            "/financial-years/{id}/reset",
            get(preview_reset).post(execute_reset),
        )
}

/// Response for a financial year.
#[derive(Debug, Serialize)]
pub struct FinancialYearResponse {
    /// Financial year ID.
    pub id: Uuid,
    /// Label, e.g. `2024-2025`.
    pub label: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day (inclusive).
    pub end_date: NaiveDate,
    /// Whether this is the current year.
    pub is_current: bool,
}

impl From<financial_years::Model> for FinancialYearResponse {
    fn from(year: financial_years::Model) -> Self {
        Self {
            id: year.id,
            label: year.label,
            start_date: year.start_date,
            end_date: year.end_date,
            is_current: year.is_current,
        }
    }
}

/// Response listing financial years.
#[derive(Debug, Serialize)]
pub struct FinancialYearListResponse {
    /// Years, newest first.
    pub financial_years: Vec<FinancialYearResponse>,
}

/// Request body for executing a reset.
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    /// Must equal `RESET <label>`.
    pub confirmation: String,
}

/// Response for an executed reset.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// The cleared year, unchanged.
    pub financial_year: FinancialYearResponse,
    /// Records deleted per table.
    pub deleted: ResetCounts,
}

fn require_admin(auth: &AuthUser, action: &str) -> Result<UserRole, AppError> {
    auth.require(UserRole::can_manage_financial_years, action)
}

/// GET `/financial-years` - List all financial years.
async fn list_financial_years(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<FinancialYearListResponse>> {
    let repo = FinancialYearRepository::new((*state.db).clone());
    let years = repo.list().await?;

    Ok(Json(FinancialYearListResponse {
        financial_years: years.into_iter().map(Into::into).collect(),
    }))
}

/// GET `/financial-years/current` - Current year, created on first use.
///
/// The only write happens when no year is current, and then it is the row
/// for the server's own date. Repeating it is a no-op and it takes no
/// caller input, so it stays outside the same-site check.
async fn get_current(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<FinancialYearResponse>> {
    let repo = FinancialYearRepository::new((*state.db).clone());
    let year = repo.get_or_create_current(Utc::now().date_naive()).await?;

    Ok(Json(year.into()))
}

/// POST `/financial-years/next` - Advance to the following year.
async fn start_next(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<FinancialYearResponse>> {
    require_admin(&auth, "start the next financial year")?;

    let repo = FinancialYearRepository::new((*state.db).clone());
    let year = repo.start_next().await?;

    info!(
        user_id = %auth.user_id(),
        financial_year_id = %year.id,
        label = %year.label,
        "Next financial year started"
    );
    Ok(Json(year.into()))
}

/// POST `/financial-years/{id}/current` - Make an existing year current.
async fn set_current(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FinancialYearResponse>> {
    require_admin(&auth, "change the current financial year")?;

    let repo = FinancialYearRepository::new((*state.db).clone());
    let year = repo.set_current(id).await?;

    info!(
        user_id = %auth.user_id(),
        financial_year_id = %year.id,
        "Current financial year changed"
    );
    Ok(Json(year.into()))
}

/// GET `/financial-years/{id}/reset` - Count what a reset would delete.
async fn preview_reset(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ResetCounts>> {
    require_admin(&auth, "preview a financial year reset")?;

    let repo = FinancialYearRepository::new((*state.db).clone());
    let counts = repo.preview_reset(id).await?;

    Ok(Json(counts))
}

/// POST `/financial-years/{id}/reset` - Delete all records inside the year.
async fn execute_reset(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<ResetRequest>, JsonRejection>,
) -> ApiResult<Json<ResetResponse>> {
    require_admin(&auth, "reset a financial year")?;
    let Json(payload) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let repo = FinancialYearRepository::new((*state.db).clone());
    let outcome = repo.execute_reset(id, &payload.confirmation).await?;

    info!(
        user_id = %auth.user_id(),
        financial_year_id = %id,
        total = outcome.deleted.total(),
        "Financial year reset requested"
    );
    Ok(Json(ResetResponse {
        financial_year: outcome.financial_year.into(),
        deleted: outcome.deleted,
    }))
}
