pub mod bigquery;
pub mod gcs;
pub mod job_control;
pub mod load_runner;
pub mod object_store;
