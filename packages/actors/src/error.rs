use broker::BrokerError;
use kyc_core::{KycId, StoreError};
use storage::StorageError;
use thiserror::Error;

/// Errors from rendering a PDF.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("failed to load font: {0}")]
    Font(String),

    #[error("failed to lay out document: {0}")]
    Layout(String),

    #[error("render task failed: {0}")]
    Task(String),
}

/// Errors from processing one PDF job.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("malformed job: {0}")]
    MalformedJob(String),

    #[error("KYC record not found: {0}")]
    RecordNotFound(KycId),

    #[error("persistence error: {0}")]
    Store(#[from] StoreError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("document storage error: {0}")]
    Storage(#[from] StorageError),
}

impl WorkerError {
    /// Errors that will not go away by delivering the job again.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            WorkerError::MalformedJob(_) | WorkerError::RecordNotFound(_)
        )
    }
}

/// Errors met while stopping a worker.
#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("consumer loop failed: {0}")]
    Consumer(#[from] BrokerError),

    #[error("task failed: {0}")]
    Task(String),
}
