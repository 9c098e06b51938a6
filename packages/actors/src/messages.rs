//! Message types for the PDF worker actor.

use kyc_core::Disposition;
use ractor::RpcReplyPort;
use serde::Serialize;

use crate::JobOutcome;

/// Messages for the PdfWorkerActor.
#[derive(Debug)]
pub enum WorkerMessage {
    /// Process one delivery and answer with how to settle it.
    Deliver {
        payload: Vec<u8>,
        attempt: u32,
        reply: RpcReplyPort<Disposition>,
    },

    /// Get the worker's counters.
    GetStats { reply: RpcReplyPort<WorkerStats> },

    /// Shutdown the worker.
    Shutdown,
}

/// Counters kept by a running worker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStats {
    /// Deliveries acknowledged, including fresh skips.
    pub acked: u64,
    /// Deliveries skipped because the stored PDF was fresh.
    pub skipped: u64,
    /// Deliveries that failed with a retryable error. Whether the broker
    /// redelivers them depends on the consumer's requeue and attempt settings.
    pub retryable_failures: u64,
    /// Deliveries that failed permanently.
    pub dropped: u64,
    pub last_error: Option<String>,
}

impl WorkerStats {
    pub fn record(&mut self, outcome: &JobOutcome) {
        match outcome {
            JobOutcome::Rendered { .. } => self.acked += 1,
            JobOutcome::Fresh => {
                self.acked += 1;
                self.skipped += 1;
            }
            JobOutcome::Failed(err) => {
                if err.is_permanent() {
                    self.dropped += 1;
                } else {
                    self.retryable_failures += 1;
                }
                self.last_error = Some(err.to_string());
            }
        }
    }

    pub fn processed(&self) -> u64 {
        self.acked + self.retryable_failures + self.dropped
    }
}
