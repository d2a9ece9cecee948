use bq_ops_core::contract::CancelAck;
use bq_ops_core::jobs::JobSummary;

pub trait JobControl {
    fn list_jobs(&self, project: &str, max_results: usize) -> Result<Vec<JobSummary>, String>;
    fn cancel_job(&self, job_id: &str, location: &str) -> Result<CancelAck, String>;
}
