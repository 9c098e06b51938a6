use actors::WorkerStats;
use broker::JobPublisher;
use kyc_core::QueueStatus;
use serde::Serialize;

use crate::{AdminService, ServiceError};

/// Queue status, counters of the in-process worker if any, and the storage backend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStatus {
    pub queue: QueueStatus,
    pub worker: Option<WorkerStats>,
    /// Backend holding rendered PDFs (`s3`, `filesystem`, `memory`).
    pub storage_backend: &'static str,
}

impl<P: JobPublisher> AdminService<P> {
    pub async fn queue_status(&self) -> Result<QueueStatus, ServiceError> {
        Ok(self.producer.queue_status().await?)
    }

    pub async fn pipeline_status(&self) -> Result<PipelineStatus, ServiceError> {
        let queue = self.queue_status().await?;
        let worker = match &self.worker {
            Some(mailbox) => mailbox.stats().await,
            None => None,
        };
        Ok(PipelineStatus {
            queue,
            worker,
            storage_backend: self.documents.backend(),
        })
    }
}
