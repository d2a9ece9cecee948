use bq_ops_core::contract::CancelAck;
use bq_ops_core::jobs::JobSummary;

use super::error::BigQueryError;
use super::response::{CancelResponse, JobListResponse, JobResource};

/// Location assumed when the service omits one, matching the default the
/// reference tooling cancelled against.
pub(super) const DEFAULT_LOCATION: &str = "us";

pub(super) fn parse_job_list(response: JobListResponse) -> Vec<JobSummary> {
    response.jobs.into_iter().filter_map(summarize_job).collect()
}

pub(super) fn parse_cancel_response(response: CancelResponse) -> Result<CancelAck, BigQueryError> {
    let reference = response
        .job
        .and_then(|job| job.job_reference)
        .ok_or_else(|| {
            BigQueryError::Api("cancel response carried no job reference".to_string())
        })?;

    Ok(CancelAck {
        location: reference.location.unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        job_id: reference.job_id,
    })
}

fn summarize_job(job: JobResource) -> Option<JobSummary> {
    let reference = job.job_reference?;
    let status = job.status;
    Some(JobSummary {
        job_id: reference.job_id,
        location: reference
            .location
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        state: status
            .as_ref()
            .and_then(|status| status.state.clone())
            .unwrap_or_default(),
        error_reason: status.and_then(|status| status.error_result.and_then(|error| error.reason)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_list_maps_reference_state_and_error_reason() {
        let raw = serde_json::json!({
            "jobs": [
                {
                    "jobReference": {"projectId": "proj", "jobId": "job-1", "location": "EU"},
                    "status": {"state": "RUNNING"}
                },
                {
                    "jobReference": {"jobId": "job-2"},
                    "status": {
                        "state": "DONE",
                        "errorResult": {"reason": "stopped", "message": "Job cancelled"}
                    }
                },
                {
                    "status": {"state": "PENDING"}
                }
            ]
        });
        let response: JobListResponse =
            serde_json::from_value(raw).expect("job list should decode");

        let summaries = parse_job_list(response);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].job_id, "job-1");
        assert_eq!(summaries[0].location, "EU");
        assert_eq!(summaries[0].state, "RUNNING");
        assert_eq!(summaries[0].error_reason, None);
        assert_eq!(summaries[1].location, DEFAULT_LOCATION);
        assert_eq!(summaries[1].error_reason.as_deref(), Some("stopped"));
    }

    #[test]
    fn empty_job_list_decodes_to_no_summaries() {
        let response: JobListResponse =
            serde_json::from_value(serde_json::json!({})).expect("empty list should decode");
        assert!(parse_job_list(response).is_empty());
    }

    #[test]
    fn cancel_response_echoes_location_and_id() {
        let raw = serde_json::json!({
            "job": {
                "jobReference": {"jobId": "job-1", "location": "us"},
                "status": {"state": "RUNNING"}
            }
        });
        let response: CancelResponse =
            serde_json::from_value(raw).expect("cancel response should decode");

        let ack = parse_cancel_response(response).expect("ack should parse");
        assert_eq!(ack.location, "us");
        assert_eq!(ack.job_id, "job-1");
    }

    #[test]
    fn cancel_response_without_reference_is_rejected() {
        let response: CancelResponse =
            serde_json::from_value(serde_json::json!({})).expect("empty response should decode");
        let error = parse_cancel_response(response).expect_err("missing reference should fail");
        assert!(error.to_string().contains("no job reference"));
    }
}
