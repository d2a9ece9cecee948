//! Thin blocking REST client for the BigQuery v2 job and table surfaces.
//!
//! Wraps jobs.list / jobs.cancel / jobs.insert / jobs.get / tables.get and
//! maps their envelopes onto the domain contract without leaking response
//! shapes to the orchestrators.

mod client;
mod error;
mod parser;
mod response;

pub use client::BigQueryClient;
pub use error::BigQueryError;
