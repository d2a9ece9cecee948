use std::process::exit;

use bq_ops_runtime::adapters::bigquery::BigQueryClient;
use bq_ops_runtime::adapters::gcs::GcsClient;
use bq_ops_runtime::handlers::ingest::{run_batch_ingest, DatasetTarget};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "load_csv",
    about = "Discover CSV files in a GCS bucket and load them into BigQuery"
)]
struct Cli {
    /// Project the destination dataset lives in
    #[arg(long)]
    project: String,
    /// Destination dataset
    #[arg(long)]
    dataset: String,
    /// Bucket to discover objects in
    #[arg(long)]
    bucket: String,
    /// Restrict discovery to objects under this prefix
    #[arg(long)]
    prefix: Option<String>,
    /// Only load objects whose file date equals this YYYYMMDD run date
    #[arg(long)]
    run_date: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let access_token = match std::env::var("GCP_ACCESS_TOKEN") {
        Ok(value) => value,
        Err(_) => {
            eprintln!("GCP_ACCESS_TOKEN must be configured");
            exit(1);
        }
    };

    let bigquery = BigQueryClient::new(&cli.project, &access_token);
    let gcs = GcsClient::new(&access_token);
    let target = DatasetTarget {
        project: cli.project,
        dataset: cli.dataset,
    };

    match run_batch_ingest(
        &target,
        &cli.bucket,
        cli.prefix.as_deref(),
        cli.run_date.as_deref(),
        &gcs,
        &bigquery,
    ) {
        Ok(reports) => {
            for report in reports {
                println!(
                    "Loaded data to table {}, num rows {}",
                    report.table_id, report.row_count
                );
            }
        }
        Err(error) => {
            eprintln!("{error}");
            exit(1);
        }
    }
}
