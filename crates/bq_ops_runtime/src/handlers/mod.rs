pub mod cancel;
pub mod ingest;
