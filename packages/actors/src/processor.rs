//! Per-delivery processing of PDF jobs.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use kyc_core::{DEFAULT_FRESHNESS, Disposition, KycId, PdfJob, RecordStore};
use storage::Storage;
use summary::SummaryProvider;

use crate::{PdfRenderer, RenderError, WorkerError};

/// What happened to one delivery.
#[derive(Debug)]
pub enum JobOutcome {
    /// A new PDF was rendered and recorded.
    Rendered { pdf_path: String },
    /// The stored PDF was recent enough; nothing was rendered.
    Fresh,
    Failed(WorkerError),
}

impl JobOutcome {
    /// The acknowledgement this outcome calls for.
    pub fn disposition(&self) -> Disposition {
        match self {
            JobOutcome::Rendered { .. } | JobOutcome::Fresh => Disposition::Ack,
            JobOutcome::Failed(err) if err.is_permanent() => Disposition::reject(err.to_string()),
            JobOutcome::Failed(err) => Disposition::requeue(err.to_string()),
        }
    }
}

/// Turns a job payload into a stored PDF.
pub struct JobProcessor {
    store: Arc<dyn RecordStore>,
    renderer: Arc<dyn PdfRenderer>,
    documents: Storage,
    summaries: SummaryProvider,
    freshness: Duration,
}

impl JobProcessor {
    pub fn new(
        store: Arc<dyn RecordStore>,
        renderer: Arc<dyn PdfRenderer>,
        documents: Storage,
        summaries: SummaryProvider,
    ) -> Self {
        Self {
            store,
            renderer,
            documents,
            summaries,
            freshness: DEFAULT_FRESHNESS,
        }
    }

    /// Set how long a rendered PDF counts as fresh.
    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    /// Process one delivery body.
    ///
    /// Malformed payloads and missing records are permanent failures. Other
    /// failures are retryable and are written to the record, best effort.
    pub async fn process(&self, payload: &[u8], attempt: u32) -> JobOutcome {
        let job = match PdfJob::from_bytes(payload) {
            Ok(job) => job,
            Err(e) => {
                tracing::error!("Dropping malformed PDF job: {}", e);
                return JobOutcome::Failed(WorkerError::MalformedJob(e.to_string()));
            }
        };

        tracing::info!(
            "Processing PDF job {} for KYC {} (attempt {}, requested by {})",
            job.job_id,
            job.record_id,
            attempt,
            job.requested_by
        );

        match self.generate(&job).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!("PDF job {} for KYC {} failed: {}", job.job_id, job.record_id, err);
                if !err.is_permanent() {
                    self.record_failure(&job.record_id, &err).await;
                }
                JobOutcome::Failed(err)
            }
        }
    }

    async fn generate(&self, job: &PdfJob) -> Result<JobOutcome, WorkerError> {
        let record = self
            .store
            .load(&job.record_id)
            .await?
            .ok_or_else(|| WorkerError::RecordNotFound(job.record_id.clone()))?;

        if record.has_fresh_pdf(Utc::now(), self.freshness) {
            tracing::info!("PDF for KYC {} is fresh, skipping", record.id);
            return Ok(JobOutcome::Fresh);
        }

        let summary = self.summaries.summarize(&record).await;

        let renderer = self.renderer.clone();
        let generated_at = Utc::now();
        let pdf = {
            let record = record.clone();
            tokio::task::spawn_blocking(move || renderer.render(&record, &summary, generated_at))
                .await
                .map_err(|e| RenderError::Task(e.to_string()))??
        };

        let pdf_path = self.documents.put_pdf(&record.id, pdf).await?;
        self.store
            .mark_pdf_generated(&record.id, &pdf_path, generated_at)
            .await?;

        tracing::info!("PDF generated for KYC {} at {}", record.id, pdf_path);
        Ok(JobOutcome::Rendered { pdf_path })
    }

    async fn record_failure(&self, id: &KycId, err: &WorkerError) {
        let message = err.to_string();
        if let Err(e) = self.store.mark_pdf_error(id, &message, Utc::now()).await {
            tracing::warn!("Could not record PDF error on KYC {}: {}", id, e);
        }
    }
}
