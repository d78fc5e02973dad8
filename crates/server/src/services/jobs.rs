//! Job workflows that touch more than one table.

use std::collections::HashSet;

use sqlx::PgPool;

use crewdesk_core::{InventoryRequestId, ItemType, JobId, JobStatus, ReturnStatus, UserId};

use super::ServiceError;
use crate::db::jobs::{Assignment, Job, JobHistoryEntry};
use crate::db::{items, jobs, requests};

/// One entry in a job-completion return manifest.
#[derive(Debug)]
pub struct ReturnDisposition {
    pub request_id: InventoryRequestId,
    pub return_status: ReturnStatus,
    pub return_notes: Option<String>,
}

/// Assign a job to a user and flip it to `in_progress`, atomically.
///
/// # Errors
///
/// `Repository` if the job or user doesn't exist (foreign key).
pub async fn assign_job(
    pool: &PgPool,
    job_id: JobId,
    user_id: UserId,
) -> Result<Assignment, ServiceError> {
    let mut tx = pool.begin().await?;

    let assignment = jobs::insert_assignment(&mut tx, job_id, user_id).await?;
    jobs::set_job_status(&mut tx, job_id, JobStatus::InProgress).await?;

    tx.commit().await?;
    Ok(assignment)
}

/// Update a job's status. Moving to `completed` also returns the
/// stock of every approved reusable request linked to the job.
///
/// The restock pass changes only `inventory_items.quantity`; the
/// requests themselves stay `approved`, and a later explicit return
/// confirmation is what closes them.
///
/// # Errors
///
/// `NotFound` if the job doesn't exist.
pub async fn update_job_status(
    pool: &PgPool,
    job_id: JobId,
    status: JobStatus,
) -> Result<Job, ServiceError> {
    let mut tx = pool.begin().await?;

    let job = match jobs::set_job_status(&mut tx, job_id, status).await {
        Ok(job) => job,
        Err(crate::db::RepositoryError::NotFound) => {
            return Err(ServiceError::NotFound("job".to_owned()));
        }
        Err(e) => return Err(e.into()),
    };

    if status == JobStatus::Completed {
        let approved = requests::list_approved_for_job(&mut tx, job_id).await?;
        for request in approved {
            if request.item_type == ItemType::Reusable {
                items::release_stock(&mut tx, request.item_id, request.quantity).await?;
            }
        }
    }

    tx.commit().await?;
    Ok(job)
}

/// Complete a job and record the return disposition of its borrowed
/// items.
///
/// Stock comes back only for entries marked `returned`; damaged and
/// lost items stay deducted. Request ids not found in the database are
/// skipped, as is any id repeated within the manifest (only the first
/// entry counts); entries referencing a request already finalized
/// abort the whole batch, so a disposition can never be applied twice.
///
/// # Errors
///
/// `NotFound` if the job doesn't exist, `InvalidState` if an entry
/// references a finalized request.
pub async fn complete_job_with_returns(
    pool: &PgPool,
    job_id: JobId,
    returned_items: Vec<ReturnDisposition>,
) -> Result<Job, ServiceError> {
    let mut tx = pool.begin().await?;

    let job = match jobs::set_job_status(&mut tx, job_id, JobStatus::Completed).await {
        Ok(job) => job,
        Err(crate::db::RepositoryError::NotFound) => {
            return Err(ServiceError::NotFound("job".to_owned()));
        }
        Err(e) => return Err(e.into()),
    };

    let mut seen = HashSet::new();
    for entry in returned_items {
        if !seen.insert(entry.request_id) {
            continue;
        }
        let Some(request) = requests::find_request_for_update(&mut tx, entry.request_id).await?
        else {
            continue;
        };
        if request.status.is_terminal() {
            return Err(ServiceError::InvalidState(format!(
                "request {} is already finalized",
                request.id
            )));
        }

        requests::set_return_disposition(
            &mut tx,
            entry.request_id,
            entry.return_status,
            entry.return_notes.as_deref(),
        )
        .await?;

        if entry.return_status == ReturnStatus::Returned {
            items::release_stock(&mut tx, request.item_id, request.quantity).await?;
        }
    }

    tx.commit().await?;
    Ok(job)
}

/// Record a completion report for a job and mark it `completed`.
///
/// # Errors
///
/// `Repository` if the job or employee doesn't exist.
pub async fn record_history(
    pool: &PgPool,
    job_id: JobId,
    employee_id: UserId,
    description: Option<&str>,
) -> Result<JobHistoryEntry, ServiceError> {
    let mut tx = pool.begin().await?;

    let entry = jobs::insert_history(&mut tx, job_id, employee_id, description).await?;
    jobs::set_job_status(&mut tx, job_id, JobStatus::Completed).await?;

    tx.commit().await?;
    Ok(entry)
}
