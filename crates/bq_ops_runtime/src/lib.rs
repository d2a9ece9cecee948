//! Runtime integration for the warehouse-operations toolbox.
//!
//! This crate owns collaborator traits, the BigQuery and GCS REST adapters,
//! and the orchestration handlers behind the `cancel_jobs`, `load_csv`, and
//! `object_listener` binaries. Deterministic derivation logic lives in
//! `bq_ops_core`.

pub mod adapters;
pub mod handlers;
