use std::process::exit;
use std::sync::Arc;

use bq_ops_runtime::adapters::bigquery::BigQueryClient;
use bq_ops_runtime::adapters::job_control::JobControl;
use bq_ops_runtime::handlers::cancel::{run_cancellation, CancelOutcome, CancelRequest};
use clap::Parser;

#[derive(Parser)]
#[command(name = "cancel_jobs", about = "Cancel outstanding BigQuery jobs")]
struct Cli {
    /// Project whose jobs are targeted
    #[arg(long)]
    project: String,
    /// Explicit job ids to cancel; live jobs are discovered when omitted
    #[arg(value_name = "JOBS")]
    jobs: Vec<String>,
    /// Cancel only pending jobs
    #[arg(long)]
    pending: bool,
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

    let control: Arc<dyn JobControl + Send + Sync> =
        Arc::new(BigQueryClient::new(&cli.project, &access_token));
    let request = CancelRequest {
        project: cli.project,
        explicit_job_ids: cli.jobs,
        pending_only: cli.pending,
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("failed to start async runtime: {error}");
            exit(1);
        }
    };

    match runtime.block_on(run_cancellation(request, control)) {
        Ok(CancelOutcome::NothingToDo) => println!("no bq jobs to cancel."),
        Ok(CancelOutcome::Completed { requested, failed }) => {
            for ack in &requested {
                println!(
                    "requested cancellation for job {}:{}.",
                    ack.location, ack.job_id
                );
            }
            if !failed.is_empty() {
                for failure in &failed {
                    eprintln!("failed to cancel job {}: {}", failure.job_id, failure.error);
                }
                exit(1);
            }
        }
        Err(error) => {
            eprintln!("{error}");
            exit(1);
        }
    }
}
