//! KYC PDF worker binary.
//!
//! `kyc-pdf-worker` consumes the PDF queue until interrupted.
//! `kyc-pdf-worker enqueue <id>...` publishes generation jobs for existing
//! records and `kyc-pdf-worker status` prints the queue depth.

use std::sync::Arc;

use actors::{GenPdfRenderer, JobProcessor, WorkerConfig, start_worker};
use api::{AdminService, BatchPdfRequest, PdfRequest};
use broker::{BrokerConfig, BrokerConnection, ConsumeOptions, Producer};
use db::DbConfig;
use db::repositories::KycRepository;
use kyc_core::KycId;
use storage::Storage;
use summary::{SummaryConfig, SummaryProvider};
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

enum Command {
    Work,
    Enqueue(Vec<KycId>),
    Status,
}

fn parse_args() -> Result<Command, BoxError> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None | Some("work") => Ok(Command::Work),
        Some("enqueue") => {
            let ids: Vec<KycId> = args.map(KycId::from).collect();
            if ids.is_empty() {
                return Err("usage: kyc-pdf-worker enqueue <kyc-id>...".into());
            }
            Ok(Command::Enqueue(ids))
        }
        Some("status") => Ok(Command::Status),
        Some(other) => Err(format!("unknown command: {other}").into()),
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let command = parse_args()?;

    db::init(DbConfig::from_env()).await?;
    let documents = Storage::from_env().await?;
    let broker = Arc::new(BrokerConnection::new(BrokerConfig::from_env()));

    let result = match command {
        Command::Work => run_worker(broker.clone(), documents).await,
        Command::Enqueue(ids) => enqueue(broker.clone(), documents, ids).await,
        Command::Status => status(broker.clone(), documents).await,
    };

    for err in broker.close().await {
        tracing::warn!("Broker close failed: {}", err);
    }

    result
}

async fn run_worker(broker: Arc<BrokerConnection>, documents: Storage) -> Result<(), BoxError> {
    let summaries = SummaryProvider::from_config(SummaryConfig::from_env());
    broker.connect().await?;

    let config = WorkerConfig::from_env();
    let renderer = GenPdfRenderer::new(config.font_dir.clone(), config.font_name.clone());
    let processor = JobProcessor::new(
        Arc::new(KycRepository),
        Arc::new(renderer),
        documents,
        summaries,
    )
    .with_freshness(config.freshness);

    let worker = start_worker(processor, broker, ConsumeOptions::from_env()).await?;
    tracing::info!("PDF worker running, press Ctrl+C to stop");

    let consumer_ended = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown requested");
            false
        }
        _ = worker.finished() => {
            tracing::error!("PDF consumer stopped unexpectedly");
            true
        }
    };

    if let Some(stats) = worker.mailbox().stats().await {
        tracing::info!(
            processed = stats.processed(),
            acked = stats.acked,
            skipped = stats.skipped,
            retryable_failures = stats.retryable_failures,
            dropped = stats.dropped,
            "Worker totals"
        );
    }

    for err in worker.stop().await {
        tracing::error!("Shutdown error: {}", err);
    }

    // Non-zero exit so a process supervisor restarts the worker.
    if consumer_ended {
        return Err("PDF consumer stopped before shutdown was requested".into());
    }
    Ok(())
}

fn admin(broker: Arc<BrokerConnection>, documents: Storage) -> AdminService {
    AdminService::new(Producer::new(broker), Arc::new(KycRepository), documents)
}

async fn enqueue(
    broker: Arc<BrokerConnection>,
    documents: Storage,
    ids: Vec<KycId>,
) -> Result<(), BoxError> {
    let service = admin(broker, documents);
    let requested_by = std::env::var("USER").unwrap_or_else(|_| "cli".to_string());

    if let [id] = ids.as_slice() {
        let job = service
            .request_pdf(id, &requested_by, PdfRequest::default())
            .await?;
        println!("queued {} for {} at priority {}", job.job_id, id, job.priority);
        return Ok(());
    }

    let outcome = service
        .request_batch(
            &requested_by,
            BatchPdfRequest {
                kyc_ids: ids,
                priority: None,
            },
        )
        .await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn status(broker: Arc<BrokerConnection>, documents: Storage) -> Result<(), BoxError> {
    let status = admin(broker, documents).pipeline_status().await?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
