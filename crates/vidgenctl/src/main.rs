use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vidgen_client::{HttpStatusClient, StatusSource, Tracker, TrackerConfig};
use vidgen_core::api::{GenerateRequest, SubmitDisposition};
use vidgen_core::backoff::BackoffPolicy;
use vidgen_core::error::TrackOutcome;
use vidgen_core::model::JobId;

#[derive(Debug, Parser)]
#[command(name = "vidgenctl", version, about = "Submit and track video generation jobs")]
struct Cli {
    /// Generation service base URL, e.g. http://127.0.0.1:8000
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server: String,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Submit a generation job and watch it to completion.
    Generate {
        /// Question id; doubles as the job id.
        #[arg(long)]
        question_id: String,

        /// Question text.
        #[arg(long)]
        question: String,

        /// Reference solution text.
        #[arg(long)]
        solution: String,

        /// Seconds between status reads while the service is healthy.
        #[arg(long, default_value_t = 2)]
        poll_interval_seconds: u64,

        /// Consecutive failed reads tolerated before giving up.
        #[arg(long, default_value_t = 60)]
        max_attempts: u32,
    },
    /// Print the current status for a question id.
    Status {
        /// Question id to look up.
        #[arg(long)]
        question_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let client = HttpStatusClient::new(&cli.server);

    match cli.cmd {
        Cmd::Generate {
            question_id,
            question,
            solution,
            poll_interval_seconds,
            max_attempts,
        } => {
            generate(
                client,
                question_id,
                question,
                solution,
                poll_interval_seconds,
                max_attempts,
            )
            .await
        }
        Cmd::Status { question_id } => {
            let status = client
                .fetch_status(&JobId::from_str(question_id))
                .await
                .context("reading job status")?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
    }
}

async fn generate(
    client: HttpStatusClient,
    question_id: String,
    question: String,
    solution: String,
    poll_interval_seconds: u64,
    max_attempts: u32,
) -> anyhow::Result<()> {
    let job_id = JobId::from_str(&question_id);

    let resp = client
        .submit(&GenerateRequest {
            question_id: question_id.clone(),
            question,
            solution,
        })
        .await
        .context("submitting generation job")?;

    if resp.status == SubmitDisposition::AlreadyExists {
        println!(
            "video already exists: {}",
            resp.video_file.as_deref().unwrap_or("<unknown>")
        );
        println!("download: {}", client.video_url(&job_id));
        return Ok(());
    }

    info!("{} (job {})", resp.message, resp.job_id.as_deref().unwrap_or("-"));
    if let Some(secs) = resp.estimated_time {
        info!("estimated generation time: {secs}s");
    }

    let config = TrackerConfig {
        backoff: BackoffPolicy {
            base_interval: Duration::from_secs(poll_interval_seconds),
            max_attempts,
            ..BackoffPolicy::default()
        },
    };

    let (done_tx, mut done_rx) = tokio::sync::mpsc::unbounded_channel();
    let handle = Tracker::new(client.clone(), job_id.clone())
        .with_config(config)
        .on_progress(|s| {
            let pct = s
                .progress
                .map(|p| format!("{p:.0}%"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "[{}] {pct} {}",
                s.status,
                s.current_step.as_deref().unwrap_or("")
            );
        })
        .on_terminal(move |outcome| {
            let _ = done_tx.send(outcome.clone());
        })
        .spawn();

    let outcome = tokio::select! {
        out = done_rx.recv() => out.context("tracker ended without a terminal event")?,
        _ = tokio::signal::ctrl_c() => {
            handle.cancel();
            info!("cancelled; the job keeps running server-side");
            return Ok(());
        }
    };

    match outcome {
        TrackOutcome::Completed(status) => {
            println!(
                "completed: {}",
                status.video_file.as_deref().unwrap_or("<no artifact>")
            );
            println!("download: {}", client.video_url(&job_id));
            Ok(())
        }
        TrackOutcome::Failed(failure) => Err(anyhow::Error::new(failure)),
    }
}
