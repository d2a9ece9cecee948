//! Shared warehouse-operations domain primitives.
//!
//! This crate owns deterministic behavior only: file-name-to-table-identity
//! derivation, job status derivation and cancellation selection, and the
//! request/response contracts spoken to BigQuery and GCS. It intentionally
//! excludes HTTP clients, async runtime, and environment access.

pub mod contract;
pub mod jobs;
pub mod naming;
