//! Queue declaration and reporting types.

use serde::{Deserialize, Serialize};

use crate::{KycId, Priority};

/// Well-known name of the PDF generation queue.
pub const PDF_QUEUE: &str = "pdf_generation_queue";

/// Declaration properties of the job queue.
///
/// Declaring twice with identical properties is a no-op on the broker;
/// declaring with different properties fails the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSpec {
    pub name: String,
    /// Survives a broker restart.
    pub durable: bool,
    /// Value of `x-max-priority`.
    pub max_priority: u8,
}

impl Default for QueueSpec {
    fn default() -> Self {
        Self {
            name: PDF_QUEUE.to_string(),
            durable: true,
            max_priority: Priority::MAX,
        }
    }
}

impl QueueSpec {
    /// Use a different queue name with the default properties.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Point-in-time view of the queue, for dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    pub queue_name: String,
    /// Messages ready for delivery.
    pub message_count: u32,
    pub consumer_count: u32,
}

/// One failed enqueue inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    pub id: KycId,
    pub error: String,
}

/// Result of a batch enqueue. Per-id failures are reported here instead
/// of failing the whole call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    #[serde(default)]
    pub errors: Vec<BatchError>,
}

impl BatchOutcome {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn record_success(&mut self) {
        self.successful += 1;
    }

    pub fn record_failure(&mut self, id: KycId, error: impl Into<String>) {
        self.failed += 1;
        self.errors.push(BatchError {
            id,
            error: error.into(),
        });
    }

    /// True when every id was enqueued.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.successful == self.total
    }
}
