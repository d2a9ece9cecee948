use std::sync::Arc;

use bq_ops_core::contract::{CancelAck, MAX_LISTED_JOBS};
use bq_ops_core::jobs::{select_jobs_to_cancel, DerivedStatus, DEFAULT_TARGET_STATES};
use serde_json::json;

use crate::adapters::job_control::JobControl;

/// Location assumed for explicitly supplied job ids, which arrive without
/// one.
const EXPLICIT_JOB_LOCATION: &str = "us";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelRequest {
    pub project: String,
    /// Explicit job ids, used verbatim with no existence pre-check. When
    /// empty, live jobs are discovered from the service instead.
    pub explicit_job_ids: Vec<String>,
    /// Narrow the discovery target set to pending jobs only.
    pub pending_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelFailure {
    pub job_id: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// No jobs matched the target set; no cancellation request was issued.
    NothingToDo,
    Completed {
        requested: Vec<CancelAck>,
        failed: Vec<CancelFailure>,
    },
}

/// Request cancellation for the target set of jobs.
///
/// All cancellation requests are initiated together and awaited behind a
/// single barrier; no ordering is guaranteed between them. Acceptance acks
/// are collected for the report, but whether a job actually stops is not
/// verified.
pub async fn run_cancellation(
    request: CancelRequest,
    control: Arc<dyn JobControl + Send + Sync>,
) -> Result<CancelOutcome, String> {
    let targets = if request.explicit_job_ids.is_empty() {
        discover_targets(&request, Arc::clone(&control)).await?
    } else {
        request
            .explicit_job_ids
            .iter()
            .map(|job_id| (job_id.clone(), EXPLICIT_JOB_LOCATION.to_string()))
            .collect()
    };

    if targets.is_empty() {
        log_cancel_info("nothing_to_do", json!({ "project": request.project }));
        return Ok(CancelOutcome::NothingToDo);
    }

    log_cancel_info(
        "cancellation_requested",
        json!({
            "project": request.project,
            "job_ids": targets.iter().map(|(job_id, _)| job_id.clone()).collect::<Vec<_>>(),
        }),
    );

    let mut handles = Vec::with_capacity(targets.len());
    for (job_id, location) in targets {
        let control = Arc::clone(&control);
        let task_job_id = job_id.clone();
        let handle =
            tokio::task::spawn_blocking(move || control.cancel_job(&task_job_id, &location));
        handles.push((job_id, handle));
    }

    let mut requested = Vec::with_capacity(handles.len());
    let mut failed = Vec::new();
    for (job_id, handle) in handles {
        match handle.await {
            Ok(Ok(ack)) => {
                log_cancel_info(
                    "cancellation_accepted",
                    json!({ "location": ack.location, "job_id": ack.job_id }),
                );
                requested.push(ack);
            }
            Ok(Err(error)) => failed.push(collect_failure(job_id, error)),
            Err(join_error) => failed.push(collect_failure(
                job_id,
                format!("cancellation task panicked: {join_error}"),
            )),
        }
    }

    Ok(CancelOutcome::Completed { requested, failed })
}

async fn discover_targets(
    request: &CancelRequest,
    control: Arc<dyn JobControl + Send + Sync>,
) -> Result<Vec<(String, String)>, String> {
    let targets: &[DerivedStatus] = if request.pending_only {
        &[DerivedStatus::Pending]
    } else {
        DEFAULT_TARGET_STATES
    };

    let project = request.project.clone();
    let jobs = tokio::task::spawn_blocking(move || control.list_jobs(&project, MAX_LISTED_JOBS))
        .await
        .map_err(|join_error| format!("job listing task panicked: {join_error}"))??;

    Ok(select_jobs_to_cancel(&jobs, targets)
        .into_iter()
        .map(|job| (job.job_id, job.location))
        .collect())
}

fn collect_failure(job_id: String, error: String) -> CancelFailure {
    log_cancel_error("cancellation_failed", json!({ "job_id": job_id, "error": error }));
    CancelFailure { job_id, error }
}

fn log_cancel_info(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "cancel_handler",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn log_cancel_error(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "cancel_handler",
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
