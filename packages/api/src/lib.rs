//! Administrative operations for the PDF pipeline.
//!
//! This crate exposes what the admin surface needs, independent of any HTTP
//! framework:
//! - Requesting one PDF or a batch of PDFs
//! - PDF status and download for an application
//! - Queue and worker status

mod error;
mod pdf;
mod status;

use std::sync::Arc;

use actors::WorkerMailbox;
use broker::{BrokerConnection, JobPublisher, Producer};
use kyc_core::RecordStore;
use storage::Storage;

pub use error::ServiceError;
pub use pdf::{BatchPdfRequest, PdfRequest, PdfStatus};
pub use status::PipelineStatus;

// Re-export core types for convenience
pub use kyc_core::{BatchOutcome, KycId, PdfJob, Priority, QueueStatus};

/// Entry point for admin operations.
pub struct AdminService<P = BrokerConnection> {
    producer: Producer<P>,
    store: Arc<dyn RecordStore>,
    documents: Storage,
    worker: Option<WorkerMailbox>,
}

impl<P: JobPublisher> AdminService<P> {
    pub fn new(producer: Producer<P>, store: Arc<dyn RecordStore>, documents: Storage) -> Self {
        Self {
            producer,
            store,
            documents,
            worker: None,
        }
    }

    /// Report counters from an in-process worker alongside queue status.
    pub fn with_worker(mut self, worker: WorkerMailbox) -> Self {
        self.worker = Some(worker);
        self
    }
}
