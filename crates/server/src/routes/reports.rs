//! Admin report endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::auth::RequireAdmin;
use crate::db::reports::{self, EmployeeProductivity, TopItem, TrendPeriod, TrendPoint};
use crate::error::AppError;
use crate::state::AppState;

/// Build the reports router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/reports/employee-productivity",
            get(employee_productivity),
        )
        .route("/api/reports/top-items", get(top_items))
        .route(
            "/api/reports/completed-jobs-trend",
            get(completed_jobs_trend),
        )
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub period: Option<String>,
}

/// Completed jobs per employee over the last 30 days.
///
/// # Errors
///
/// 500 on database failure.
pub async fn employee_productivity(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<EmployeeProductivity>>, AppError> {
    let rows = reports::employee_productivity(state.pool()).await?;
    Ok(Json(rows))
}

/// The five most-requested items and their remaining stock.
///
/// # Errors
///
/// 500 on database failure.
pub async fn top_items(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<TopItem>>, AppError> {
    let rows = reports::top_items(state.pool()).await?;
    Ok(Json(rows))
}

/// Completed-job counts bucketed by day, month or year.
///
/// # Errors
///
/// 400 on an unknown period.
pub async fn completed_jobs_trend(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<Vec<TrendPoint>>, AppError> {
    let period = match query.period.as_deref() {
        None => TrendPeriod::Day,
        Some(raw) => TrendPeriod::parse(raw).ok_or_else(|| {
            AppError::BadRequest("period must be one of day, month, year".to_owned())
        })?,
    };

    let rows = reports::completed_jobs_trend(state.pool(), period).await?;
    Ok(Json(rows))
}
