//! Publishing side of the PDF queue.

use std::sync::Arc;

use chrono::Utc;
use kyc_core::{BatchOutcome, EnqueueOptions, KycId, PdfJob, Priority, QueueStatus};

use crate::{BrokerConnection, BrokerError, JobPublisher};

/// Publishes PDF jobs. Runs inline in its caller; there is no local retry.
pub struct Producer<P = BrokerConnection> {
    publisher: Arc<P>,
}

impl<P> Clone for Producer<P> {
    fn clone(&self) -> Self {
        Self {
            publisher: self.publisher.clone(),
        }
    }
}

impl<P: JobPublisher> Producer<P> {
    pub fn new(publisher: Arc<P>) -> Self {
        Self { publisher }
    }

    /// Publish one job, stamped with the current time.
    ///
    /// Returns the job as published once the broker has confirmed it.
    pub async fn enqueue(
        &self,
        mut job: PdfJob,
        options: EnqueueOptions,
    ) -> Result<PdfJob, BrokerError> {
        job.priority = job.effective_priority(&options);
        job.requested_at = Utc::now();

        let payload = job.to_bytes()?;
        self.publisher
            .publish(&payload, job.priority, &job.job_id.to_string())
            .await?;

        tracing::info!(
            "Queued PDF job {} for KYC {} (priority {})",
            job.job_id,
            job.record_id,
            job.priority
        );
        Ok(job)
    }

    /// Enqueue one job per id, in order.
    ///
    /// Failures are collected per id; the call itself never fails.
    pub async fn enqueue_batch(
        &self,
        ids: &[KycId],
        requested_by: &str,
        priority: Option<Priority>,
    ) -> BatchOutcome {
        let priority = priority.unwrap_or(Priority::BATCH);
        let mut outcome = BatchOutcome::new(ids.len());

        for id in ids {
            let job = PdfJob::new(id.clone(), requested_by).with_priority(priority);
            match self.enqueue(job, EnqueueOptions::default()).await {
                Ok(_) => outcome.record_success(),
                Err(e) => {
                    tracing::warn!("Failed to queue PDF job for KYC {}: {}", id, e);
                    outcome.record_failure(id.clone(), e.to_string());
                }
            }
        }

        tracing::info!(
            "Batch PDF request: {} queued, {} failed",
            outcome.successful,
            outcome.failed
        );
        outcome
    }

    pub async fn queue_status(&self) -> Result<QueueStatus, BrokerError> {
        self.publisher.queue_status().await
    }
}
