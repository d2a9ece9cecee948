use serde::{Deserialize, Serialize};

/// One outstanding or finished warehouse job, as reported by jobs.list.
///
/// `state` is the service-reported lifecycle state (`PENDING`, `RUNNING`,
/// `DONE`); `error_reason` is the reason code of the terminal error result,
/// if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_id: String,
    pub location: String,
    pub state: String,
    pub error_reason: Option<String>,
}

/// Job status after reclassifying the service's terminal `DONE` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivedStatus {
    Running,
    Pending,
    Successful,
    Cancelled,
    Failed,
}

impl DerivedStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Pending => "PENDING",
            Self::Successful => "SUCCESSFUL",
            Self::Cancelled => "CANCELLED",
            Self::Failed => "FAILED",
        }
    }
}

/// Reclassify a job's reported state.
///
/// A terminal `DONE` job becomes `SUCCESSFUL` when it carries no error,
/// `CANCELLED` when its error reason is exactly `stopped`, and `FAILED`
/// otherwise. Non-terminal states pass through verbatim; anything the
/// service reports outside `PENDING`/`RUNNING` is treated as `FAILED`.
pub fn derive_status(job: &JobSummary) -> DerivedStatus {
    if job.state == "DONE" {
        return match job.error_reason.as_deref() {
            None => DerivedStatus::Successful,
            Some("stopped") => DerivedStatus::Cancelled,
            Some(_) => DerivedStatus::Failed,
        };
    }
    match job.state.as_str() {
        "RUNNING" => DerivedStatus::Running,
        "PENDING" => DerivedStatus::Pending,
        _ => DerivedStatus::Failed,
    }
}

/// Default cancellation target set: jobs still doing work.
pub const DEFAULT_TARGET_STATES: &[DerivedStatus] =
    &[DerivedStatus::Running, DerivedStatus::Pending];

/// Job ids eligible for cancellation: those whose derived status is a member
/// of the whole target set. Membership is evaluated across every target
/// state, not just the first.
pub fn select_jobs_to_cancel(jobs: &[JobSummary], targets: &[DerivedStatus]) -> Vec<JobSummary> {
    jobs.iter()
        .filter(|job| targets.contains(&derive_status(job)))
        .cloned()
        .collect()
}
