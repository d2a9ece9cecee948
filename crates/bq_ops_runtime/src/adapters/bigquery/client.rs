use std::thread;
use std::time::Duration;

use bq_ops_core::contract::{CancelAck, LoadJobConfig};
use bq_ops_core::jobs::JobSummary;
use reqwest::blocking::Client;

use super::error::BigQueryError;
use super::parser::{parse_cancel_response, parse_job_list, DEFAULT_LOCATION};
use super::response::{
    CancelResponse, JobConfiguration, JobInsertRequest, JobListResponse, JobResource,
    LoadConfiguration, TableReference, TableResource,
};
use crate::adapters::job_control::JobControl;
use crate::adapters::load_runner::LoadRunner;

const BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const COMPLETION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Thin HTTP client for the BigQuery v2 jobs and tables surfaces.
///
/// Credential acquisition is out of scope; the caller supplies a ready
/// bearer token.
#[derive(Debug, Clone)]
pub struct BigQueryClient {
    client: Client,
    base_url: String,
    project: String,
    access_token: String,
}

impl BigQueryClient {
    pub fn new(project: &str, access_token: &str) -> Self {
        Self::with_base_url(BASE_URL, project, access_token)
    }

    pub fn with_base_url(base_url: &str, project: &str, access_token: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build BigQuery client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            project: project.to_string(),
            access_token: access_token.to_string(),
        }
    }

    fn fetch_jobs(
        &self,
        project: &str,
        max_results: usize,
    ) -> Result<Vec<JobSummary>, BigQueryError> {
        let url = format!("{}/projects/{project}/jobs", self.base_url);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("maxResults", max_results.to_string()),
                ("allUsers", "true".to_string()),
            ])
            .send()?
            .error_for_status()?;

        let parsed: JobListResponse = response.json().map_err(BigQueryError::Json)?;
        Ok(parse_job_list(parsed))
    }

    fn request_cancel(&self, job_id: &str, location: &str) -> Result<CancelAck, BigQueryError> {
        let url = format!(
            "{}/projects/{}/jobs/{job_id}/cancel",
            self.base_url, self.project
        );
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .query(&[("location", location)])
            .send()?
            .error_for_status()?;

        let parsed: CancelResponse = response.json().map_err(BigQueryError::Json)?;
        parse_cancel_response(parsed)
    }

    fn run_load(
        &self,
        source_uri: &str,
        table_id: &str,
        config: &LoadJobConfig,
    ) -> Result<(), BigQueryError> {
        let (project, dataset, table) = split_table_id(table_id)?;
        let request = JobInsertRequest {
            configuration: JobConfiguration {
                load: LoadConfiguration {
                    source_uris: vec![source_uri.to_string()],
                    destination_table: TableReference {
                        project_id: project,
                        dataset_id: dataset,
                        table_id: table,
                    },
                    source_format: "CSV".to_string(),
                    config: config.clone(),
                },
            },
        };

        let url = format!("{}/projects/{}/jobs", self.base_url, self.project);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()?
            .error_for_status()?;

        let submitted: JobResource = response.json().map_err(BigQueryError::Json)?;
        let reference = submitted.job_reference.ok_or_else(|| {
            BigQueryError::Api("load job submission returned no job reference".to_string())
        })?;

        self.wait_for_done(
            &reference.job_id,
            reference.location.as_deref().unwrap_or(DEFAULT_LOCATION),
        )
    }

    /// Poll jobs.get until the job reports `DONE`. A terminal error result
    /// fails the load; pending and running states keep polling.
    fn wait_for_done(&self, job_id: &str, location: &str) -> Result<(), BigQueryError> {
        let url = format!("{}/projects/{}/jobs/{job_id}", self.base_url, self.project);
        loop {
            let response = self
                .client
                .get(url.as_str())
                .bearer_auth(&self.access_token)
                .query(&[("location", location)])
                .send()?
                .error_for_status()?;
            let job: JobResource = response.json().map_err(BigQueryError::Json)?;

            let status = job.status.ok_or_else(|| {
                BigQueryError::Api(format!("job {job_id} reported no status"))
            })?;
            if status.state.as_deref() == Some("DONE") {
                return match status.error_result {
                    None => Ok(()),
                    Some(error) => Err(BigQueryError::Api(format!(
                        "load job {job_id} failed: {}: {}",
                        error.reason.unwrap_or_else(|| "unknown".to_string()),
                        error.message.unwrap_or_default(),
                    ))),
                };
            }

            thread::sleep(COMPLETION_POLL_INTERVAL);
        }
    }

    fn fetch_row_count(&self, table_id: &str) -> Result<u64, BigQueryError> {
        let (project, dataset, table) = split_table_id(table_id)?;
        let url = format!(
            "{}/projects/{project}/datasets/{dataset}/tables/{table}",
            self.base_url
        );
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()?
            .error_for_status()?;

        let parsed: TableResource = response.json().map_err(BigQueryError::Json)?;
        match parsed.num_rows {
            None => Ok(0),
            Some(raw) => raw.parse().map_err(|_| {
                BigQueryError::Api(format!("table {table_id} reported malformed row count {raw:?}"))
            }),
        }
    }
}

fn split_table_id(table_id: &str) -> Result<(String, String, String), BigQueryError> {
    let mut parts = table_id.splitn(3, '.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(project), Some(dataset), Some(table))
            if !project.is_empty() && !dataset.is_empty() && !table.is_empty() =>
        {
            Ok((project.to_string(), dataset.to_string(), table.to_string()))
        }
        _ => Err(BigQueryError::Api(format!(
            "malformed table identifier: {table_id:?}"
        ))),
    }
}

impl JobControl for BigQueryClient {
    fn list_jobs(&self, project: &str, max_results: usize) -> Result<Vec<JobSummary>, String> {
        self.fetch_jobs(project, max_results)
            .map_err(|error| error.to_string())
    }

    fn cancel_job(&self, job_id: &str, location: &str) -> Result<CancelAck, String> {
        self.request_cancel(job_id, location)
            .map_err(|error| error.to_string())
    }
}

impl LoadRunner for BigQueryClient {
    fn load_csv(
        &self,
        source_uri: &str,
        table_id: &str,
        config: &LoadJobConfig,
    ) -> Result<(), String> {
        self.run_load(source_uri, table_id, config)
            .map_err(|error| error.to_string())
    }

    fn table_row_count(&self, table_id: &str) -> Result<u64, String> {
        self.fetch_row_count(table_id)
            .map_err(|error| error.to_string())
    }
}
