//! Database operations for jobs, assignments, history, comments and
//! time logs.
//!
//! Functions taking `&mut PgConnection` are transactional building
//! blocks; the service layer composes them with the stock ledger when
//! a job transition touches inventory.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crewdesk_core::{AssignmentId, JobCommentId, JobHistoryId, JobId, JobStatus, TimeLogId, UserId};

use super::RepositoryError;

/// A job row.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub date: DateTime<Utc>,
    pub department: Option<String>,
    pub created_by: Option<UserId>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

/// A job row joined with its creator's name and assignee names, for
/// listings.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct JobWithPeople {
    pub id: JobId,
    pub title: String,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub date: DateTime<Utc>,
    pub department: Option<String>,
    pub created_by: Option<UserId>,
    pub creator_name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub assignee_names: Vec<String>,
}

/// An assignment row.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub user_id: UserId,
    pub job_id: JobId,
    pub assigned_at: DateTime<Utc>,
}

/// A job history entry.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct JobHistoryEntry {
    pub id: JobHistoryId,
    pub job_id: JobId,
    pub employee_id: UserId,
    pub description: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// A job comment joined with the author's name and avatar.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct JobComment {
    pub id: JobCommentId,
    pub job_id: JobId,
    pub user_id: UserId,
    pub user_name: String,
    pub user_image_url: Option<String>,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// A time log row.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct TimeLog {
    pub id: TimeLogId,
    pub job_id: JobId,
    pub user_id: UserId,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
}

/// Parameters for creating a job.
#[derive(Debug)]
pub struct CreateJob {
    pub title: String,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub department: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Parameters for updating a job. `None` fields are left unchanged.
#[derive(Debug, Default)]
pub struct UpdateJob {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub department: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Insert a new job with status `pending`.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn create_job(
    pool: &PgPool,
    params: &CreateJob,
    created_by: UserId,
) -> Result<Job, RepositoryError> {
    let job = sqlx::query_as::<_, Job>(
        r"
        INSERT INTO jobs (title, description, location_name, date, department, created_by, lat, lng)
        VALUES ($1, $2, $3, COALESCE($4, NOW()), $5, $6, $7, $8)
        RETURNING id, title, description, location_name, date, department, created_by,
                  lat, lng, status, created_at
        ",
    )
    .bind(&params.title)
    .bind(&params.description)
    .bind(&params.location_name)
    .bind(params.date)
    .bind(&params.department)
    .bind(created_by)
    .bind(params.lat)
    .bind(params.lng)
    .fetch_one(pool)
    .await?;

    Ok(job)
}

/// List jobs newest-first, one page at a time, with creator and
/// assignee names.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_jobs(
    pool: &PgPool,
    page: i64,
    limit: i64,
) -> Result<Vec<JobWithPeople>, RepositoryError> {
    let offset = (page - 1) * limit;
    let jobs = sqlx::query_as::<_, JobWithPeople>(
        r"
        SELECT
            j.id, j.title, j.description, j.location_name, j.date, j.department,
            j.created_by, c.name AS creator_name, j.lat, j.lng, j.status, j.created_at,
            COALESCE(array_agg(u.name ORDER BY a.assigned_at) FILTER (WHERE u.name IS NOT NULL),
                     '{}') AS assignee_names
        FROM jobs j
        LEFT JOIN users c ON c.id = j.created_by
        LEFT JOIN assignments a ON a.job_id = j.id
        LEFT JOIN users u ON u.id = a.user_id
        GROUP BY j.id, c.name
        ORDER BY j.created_at DESC
        LIMIT $1 OFFSET $2
        ",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(jobs)
}

/// Total number of jobs, for pagination metadata.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn count_jobs(pool: &PgPool) -> Result<i64, RepositoryError> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}

/// Fetch a single job with creator and assignee names.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_job(pool: &PgPool, id: JobId) -> Result<Option<JobWithPeople>, RepositoryError> {
    let job = sqlx::query_as::<_, JobWithPeople>(
        r"
        SELECT
            j.id, j.title, j.description, j.location_name, j.date, j.department,
            j.created_by, c.name AS creator_name, j.lat, j.lng, j.status, j.created_at,
            COALESCE(array_agg(u.name ORDER BY a.assigned_at) FILTER (WHERE u.name IS NOT NULL),
                     '{}') AS assignee_names
        FROM jobs j
        LEFT JOIN users c ON c.id = j.created_by
        LEFT JOIN assignments a ON a.job_id = j.id
        LEFT JOIN users u ON u.id = a.user_id
        WHERE j.id = $1
        GROUP BY j.id, c.name
        ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(job)
}

/// Update a job's editable fields.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the job doesn't exist.
pub async fn update_job(
    pool: &PgPool,
    id: JobId,
    params: &UpdateJob,
) -> Result<Job, RepositoryError> {
    let job = sqlx::query_as::<_, Job>(
        r"
        UPDATE jobs
        SET title = COALESCE($2, title),
            description = COALESCE($3, description),
            location_name = COALESCE($4, location_name),
            date = COALESCE($5, date),
            department = COALESCE($6, department),
            lat = COALESCE($7, lat),
            lng = COALESCE($8, lng)
        WHERE id = $1
        RETURNING id, title, description, location_name, date, department, created_by,
                  lat, lng, status, created_at
        ",
    )
    .bind(id)
    .bind(&params.title)
    .bind(&params.description)
    .bind(&params.location_name)
    .bind(params.date)
    .bind(&params.department)
    .bind(params.lat)
    .bind(params.lng)
    .fetch_optional(pool)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(job)
}

/// Delete a job. Returns `false` if no row matched.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the job still has dependent
/// rows (assignments, requests, history).
pub async fn delete_job(pool: &PgPool, id: JobId) -> Result<bool, RepositoryError> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_foreign_key_violation() => RepositoryError::Conflict(
                "job has linked assignments, requests or history".to_owned(),
            ),
            _ => RepositoryError::Database(e),
        })?;

    Ok(result.rows_affected() > 0)
}

/// List jobs with no assignment yet, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_unassigned_jobs(pool: &PgPool) -> Result<Vec<JobWithPeople>, RepositoryError> {
    let jobs = sqlx::query_as::<_, JobWithPeople>(
        r"
        SELECT
            j.id, j.title, j.description, j.location_name, j.date, j.department,
            j.created_by, c.name AS creator_name, j.lat, j.lng, j.status, j.created_at,
            '{}'::text[] AS assignee_names
        FROM jobs j
        LEFT JOIN users c ON c.id = j.created_by
        WHERE NOT EXISTS (SELECT 1 FROM assignments a WHERE a.job_id = j.id)
        ORDER BY j.created_at DESC
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(jobs)
}

/// List the jobs assigned to a user, most recently assigned first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_jobs_for_user(
    pool: &PgPool,
    user_id: UserId,
) -> Result<Vec<JobWithPeople>, RepositoryError> {
    let jobs = sqlx::query_as::<_, JobWithPeople>(
        r"
        SELECT
            j.id, j.title, j.description, j.location_name, j.date, j.department,
            j.created_by, c.name AS creator_name, j.lat, j.lng, j.status, j.created_at,
            COALESCE(array_agg(u.name ORDER BY a2.assigned_at) FILTER (WHERE u.name IS NOT NULL),
                     '{}') AS assignee_names
        FROM assignments mine
        INNER JOIN jobs j ON j.id = mine.job_id
        LEFT JOIN users c ON c.id = j.created_by
        LEFT JOIN assignments a2 ON a2.job_id = j.id
        LEFT JOIN users u ON u.id = a2.user_id
        WHERE mine.user_id = $1
        GROUP BY j.id, c.name, mine.assigned_at
        ORDER BY mine.assigned_at DESC
        ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(jobs)
}

/// Insert an assignment row.
///
/// Runs in the caller's transaction alongside the status flip to
/// `in_progress`.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails (including
/// a missing job or user).
pub async fn insert_assignment(
    conn: &mut PgConnection,
    job_id: JobId,
    user_id: UserId,
) -> Result<Assignment, RepositoryError> {
    let assignment = sqlx::query_as::<_, Assignment>(
        r"
        INSERT INTO assignments (job_id, user_id)
        VALUES ($1, $2)
        RETURNING id, user_id, job_id, assigned_at
        ",
    )
    .bind(job_id)
    .bind(user_id)
    .fetch_one(conn)
    .await?;

    Ok(assignment)
}

/// Set a job's status.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the job doesn't exist.
pub async fn set_job_status(
    conn: &mut PgConnection,
    id: JobId,
    status: JobStatus,
) -> Result<Job, RepositoryError> {
    let job = sqlx::query_as::<_, Job>(
        r"
        UPDATE jobs
        SET status = $2
        WHERE id = $1
        RETURNING id, title, description, location_name, date, department, created_by,
                  lat, lng, status, created_at
        ",
    )
    .bind(id)
    .bind(status)
    .fetch_optional(conn)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(job)
}

/// Insert a job history entry.
///
/// Runs in the caller's transaction alongside the status flip to
/// `completed`.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_history(
    conn: &mut PgConnection,
    job_id: JobId,
    employee_id: UserId,
    description: Option<&str>,
) -> Result<JobHistoryEntry, RepositoryError> {
    let entry = sqlx::query_as::<_, JobHistoryEntry>(
        r"
        INSERT INTO job_history (job_id, employee_id, description)
        VALUES ($1, $2, $3)
        RETURNING id, job_id, employee_id, description, completed_at
        ",
    )
    .bind(job_id)
    .bind(employee_id)
    .bind(description)
    .fetch_one(conn)
    .await?;

    Ok(entry)
}

/// List a job's comments, newest first, with author names.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_comments(pool: &PgPool, job_id: JobId) -> Result<Vec<JobComment>, RepositoryError> {
    let comments = sqlx::query_as::<_, JobComment>(
        r"
        SELECT c.id, c.job_id, c.user_id, u.name AS user_name,
               u.image_url AS user_image_url, c.comment, c.created_at
        FROM job_comments c
        INNER JOIN users u ON u.id = c.user_id
        WHERE c.job_id = $1
        ORDER BY c.created_at DESC
        ",
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;

    Ok(comments)
}

/// Insert a job comment.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_comment(
    pool: &PgPool,
    job_id: JobId,
    user_id: UserId,
    comment: &str,
) -> Result<JobComment, RepositoryError> {
    let comment = sqlx::query_as::<_, JobComment>(
        r"
        WITH inserted AS (
            INSERT INTO job_comments (job_id, user_id, comment)
            VALUES ($1, $2, $3)
            RETURNING id, job_id, user_id, comment, created_at
        )
        SELECT i.id, i.job_id, i.user_id, u.name AS user_name,
               u.image_url AS user_image_url, i.comment, i.created_at
        FROM inserted i
        INNER JOIN users u ON u.id = i.user_id
        ",
    )
    .bind(job_id)
    .bind(user_id)
    .bind(comment)
    .fetch_one(pool)
    .await?;

    Ok(comment)
}

/// List a job's time logs, most recent start first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_time_logs(pool: &PgPool, job_id: JobId) -> Result<Vec<TimeLog>, RepositoryError> {
    let logs = sqlx::query_as::<_, TimeLog>(
        r"
        SELECT id, job_id, user_id, start_time, end_time, duration_minutes
        FROM time_logs
        WHERE job_id = $1
        ORDER BY start_time DESC
        ",
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}

/// Find the user's open time log on a job, if any.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_open_time_log(
    pool: &PgPool,
    job_id: JobId,
    user_id: UserId,
) -> Result<Option<TimeLog>, RepositoryError> {
    let log = sqlx::query_as::<_, TimeLog>(
        r"
        SELECT id, job_id, user_id, start_time, end_time, duration_minutes
        FROM time_logs
        WHERE job_id = $1 AND user_id = $2 AND end_time IS NULL
        ORDER BY start_time DESC
        LIMIT 1
        ",
    )
    .bind(job_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(log)
}

/// Open a new time log starting now.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_time_log(
    pool: &PgPool,
    job_id: JobId,
    user_id: UserId,
) -> Result<TimeLog, RepositoryError> {
    let log = sqlx::query_as::<_, TimeLog>(
        r"
        INSERT INTO time_logs (job_id, user_id, start_time)
        VALUES ($1, $2, NOW())
        RETURNING id, job_id, user_id, start_time, end_time, duration_minutes
        ",
    )
    .bind(job_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(log)
}

/// Close a time log, stamping the end time and rounded duration.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the log doesn't exist.
pub async fn close_time_log(pool: &PgPool, id: TimeLogId) -> Result<TimeLog, RepositoryError> {
    let log = sqlx::query_as::<_, TimeLog>(
        r"
        UPDATE time_logs
        SET end_time = NOW(),
            duration_minutes = ROUND(EXTRACT(EPOCH FROM (NOW() - start_time)) / 60)::int
        WHERE id = $1
        RETURNING id, job_id, user_id, start_time, end_time, duration_minutes
        ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(log)
}
