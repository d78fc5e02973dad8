//! Job endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crewdesk_core::{InventoryRequestId, JobId, JobStatus, ReturnStatus, UserId};

use crate::auth::{CurrentUser, RequireAdmin};
use crate::db::jobs::{
    self, Assignment, CreateJob, Job, JobComment, JobHistoryEntry, JobWithPeople, TimeLog,
    UpdateJob,
};
use crate::error::AppError;
use crate::services::jobs as job_workflows;
use crate::services::jobs::ReturnDisposition;
use crate::state::AppState;

/// Build the jobs router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/jobs", get(list_jobs).post(create_job))
        .route("/api/jobs/me", get(my_jobs))
        .route("/api/jobs/unassigned", get(unassigned_jobs))
        .route(
            "/api/jobs/{id}",
            get(get_job).patch(update_job).delete(delete_job),
        )
        .route("/api/jobs/{id}/assign", post(assign_job))
        .route("/api/jobs/{id}/status", patch(update_status))
        .route("/api/jobs/{id}/complete", post(complete_job))
        .route("/api/jobs/{id}/history", post(record_history))
        .route("/api/jobs/{id}/comments", post(create_comment))
        .route("/api/jobs/{id}/timelog/start", post(start_timelog))
        .route("/api/jobs/{id}/timelog/stop", post(stop_timelog))
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

const fn default_page() -> i64 {
    1
}

const fn default_limit() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct JobPage {
    pub data: Vec<JobWithPeople>,
    pub meta: PageMeta,
}

#[derive(Debug, Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: JobWithPeople,
    pub comments: Vec<JobComment>,
    pub time_logs: Vec<TimeLog>,
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub department: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub department: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub user_id: UserId,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: JobStatus,
}

#[derive(Debug, Deserialize)]
pub struct ReturnItem {
    pub request_id: InventoryRequestId,
    pub return_status: ReturnStatus,
    pub return_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteJobRequest {
    #[serde(default)]
    pub returned_items: Vec<ReturnItem>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryRequest {
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub comment: String,
}

/// List jobs, newest first, one page at a time.
///
/// # Errors
///
/// 400 on a non-positive page or limit.
pub async fn list_jobs(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<JobPage>, AppError> {
    if pagination.page < 1 || pagination.limit < 1 {
        return Err(AppError::BadRequest(
            "page and limit must be positive".to_owned(),
        ));
    }

    let data = jobs::list_jobs(state.pool(), pagination.page, pagination.limit).await?;
    let total = jobs::count_jobs(state.pool()).await?;

    Ok(Json(JobPage {
        data,
        meta: PageMeta {
            total,
            page: pagination.page,
            limit: pagination.limit,
            total_pages: (total + pagination.limit - 1) / pagination.limit,
        },
    }))
}

/// Create a job.
///
/// # Errors
///
/// 500 on database failure.
pub async fn create_job(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateJobRequest>,
) -> Result<Json<Job>, AppError> {
    let job = jobs::create_job(
        state.pool(),
        &CreateJob {
            title: body.title,
            description: body.description,
            location_name: body.location_name,
            date: body.date,
            department: body.department,
            lat: body.lat,
            lng: body.lng,
        },
        admin.id,
    )
    .await?;

    Ok(Json(job))
}

/// The caller's assigned jobs, most recently assigned first.
///
/// # Errors
///
/// 500 on database failure.
pub async fn my_jobs(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<JobWithPeople>>, AppError> {
    let list = jobs::list_jobs_for_user(state.pool(), user.id).await?;
    Ok(Json(list))
}

/// Jobs nobody has been assigned to yet.
///
/// # Errors
///
/// 500 on database failure.
pub async fn unassigned_jobs(
    _user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<JobWithPeople>>, AppError> {
    let list = jobs::list_unassigned_jobs(state.pool()).await?;
    Ok(Json(list))
}

/// A job with its comments and time logs.
///
/// # Errors
///
/// 404 if the job doesn't exist.
pub async fn get_job(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<JobDetail>, AppError> {
    let job = jobs::find_job(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("job not found".to_owned()))?;
    let comments = jobs::list_comments(state.pool(), id).await?;
    let time_logs = jobs::list_time_logs(state.pool(), id).await?;

    Ok(Json(JobDetail {
        job,
        comments,
        time_logs,
    }))
}

/// Edit a job's fields.
///
/// # Errors
///
/// 404 if the job doesn't exist.
pub async fn update_job(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
    Json(body): Json<UpdateJobRequest>,
) -> Result<Json<Job>, AppError> {
    let job = jobs::update_job(
        state.pool(),
        id,
        &UpdateJob {
            title: body.title,
            description: body.description,
            location_name: body.location_name,
            date: body.date,
            department: body.department,
            lat: body.lat,
            lng: body.lng,
        },
    )
    .await?;

    Ok(Json(job))
}

/// Delete a job.
///
/// # Errors
///
/// 404 if the job doesn't exist, 409 if dependent rows remain.
pub async fn delete_job(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = jobs::delete_job(state.pool(), id).await?;
    if !deleted {
        return Err(AppError::NotFound("job not found".to_owned()));
    }
    Ok(Json(serde_json::json!({ "id": id })))
}

/// Assign a user to a job and flip it to `in_progress`.
///
/// # Errors
///
/// 500 if the job or user doesn't exist.
pub async fn assign_job(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
    Json(body): Json<AssignRequest>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = job_workflows::assign_job(state.pool(), id, body.user_id).await?;
    Ok(Json(assignment))
}

/// Change a job's status. Completing it returns the stock of approved
/// reusable requests.
///
/// # Errors
///
/// 404 if the job doesn't exist.
pub async fn update_status(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Job>, AppError> {
    let job = job_workflows::update_job_status(state.pool(), id, body.status).await?;
    Ok(Json(job))
}

/// Complete a job with a per-request return manifest.
///
/// # Errors
///
/// 404 if the job doesn't exist, 409 if an entry references a
/// finalized request.
pub async fn complete_job(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
    Json(body): Json<CompleteJobRequest>,
) -> Result<Json<Job>, AppError> {
    let returned = body
        .returned_items
        .into_iter()
        .map(|item| ReturnDisposition {
            request_id: item.request_id,
            return_status: item.return_status,
            return_notes: item.return_notes,
        })
        .collect();

    let job = job_workflows::complete_job_with_returns(state.pool(), id, returned).await?;
    Ok(Json(job))
}

/// File a completion report; marks the job completed.
///
/// # Errors
///
/// 500 if the job doesn't exist.
pub async fn record_history(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
    Json(body): Json<HistoryRequest>,
) -> Result<Json<JobHistoryEntry>, AppError> {
    let entry =
        job_workflows::record_history(state.pool(), id, user.id, body.description.as_deref())
            .await?;
    Ok(Json(entry))
}

/// Comment on a job.
///
/// # Errors
///
/// 400 on an empty comment.
pub async fn create_comment(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
    Json(body): Json<CommentRequest>,
) -> Result<Json<JobComment>, AppError> {
    if body.comment.trim().is_empty() {
        return Err(AppError::BadRequest("comment must not be empty".to_owned()));
    }

    let comment = jobs::insert_comment(state.pool(), id, user.id, &body.comment).await?;
    Ok(Json(comment))
}

/// Start the caller's timer on a job.
///
/// # Errors
///
/// 409 if a timer is already running.
pub async fn start_timelog(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<TimeLog>, AppError> {
    if jobs::find_open_time_log(state.pool(), id, user.id)
        .await?
        .is_some()
    {
        return Err(AppError::Service(
            crate::services::ServiceError::InvalidState(
                "timer is already running for this job".to_owned(),
            ),
        ));
    }

    let log = jobs::insert_time_log(state.pool(), id, user.id).await?;
    Ok(Json(log))
}

/// Stop the caller's running timer on a job.
///
/// # Errors
///
/// 409 if no timer is running.
pub async fn stop_timelog(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<TimeLog>, AppError> {
    let open = jobs::find_open_time_log(state.pool(), id, user.id)
        .await?
        .ok_or_else(|| {
            AppError::Service(crate::services::ServiceError::InvalidState(
                "no active timer to stop".to_owned(),
            ))
        })?;

    let log = jobs::close_time_log(state.pool(), open.id).await?;
    Ok(Json(log))
}
