//! Job wire types for PDF generation requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::KycId;

/// Unique identifier for a job, using ULID for chronological sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Ulid);

impl JobId {
    /// Create a new unique job ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Broker priority of a job.
///
/// Always within `Priority::MIN..=Priority::MAX`; out-of-range input is
/// clamped rather than rejected, both when constructed and when decoded
/// from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Priority(u8);

impl Priority {
    /// Lowest priority the queue accepts.
    pub const MIN: u8 = 1;
    /// Highest priority, matching the queue's `x-max-priority`.
    pub const MAX: u8 = 10;
    /// Priority for single on-demand requests.
    pub const NORMAL: Priority = Priority(5);
    /// Priority for batch fan-out requests.
    pub const BATCH: Priority = Priority(3);

    /// Create a priority, clamping into the supported range.
    pub fn new(value: i64) -> Self {
        Self(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    /// The raw priority value sent to the broker.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl From<i64> for Priority {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A request to render the compliance PDF for one KYC record.
///
/// Immutable once published. The legacy `kycId` field name is accepted
/// when decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfJob {
    /// Identifier of this request, used as the AMQP message id.
    #[serde(default)]
    pub job_id: JobId,
    /// The KYC record to render.
    #[serde(alias = "kycId")]
    pub record_id: KycId,
    /// Administrator who asked for the document.
    pub requested_by: String,
    /// Requested priority.
    #[serde(default)]
    pub priority: Priority,
    /// When the job was published.
    pub requested_at: DateTime<Utc>,
}

impl PdfJob {
    /// Create a new job at normal priority.
    pub fn new(record_id: impl Into<KycId>, requested_by: impl Into<String>) -> Self {
        Self {
            job_id: JobId::new(),
            record_id: record_id.into(),
            requested_by: requested_by.into(),
            priority: Priority::default(),
            requested_at: Utc::now(),
        }
    }

    /// Set the priority for this job.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// The priority to publish with, honouring per-call overrides.
    pub fn effective_priority(&self, options: &EnqueueOptions) -> Priority {
        options.priority.unwrap_or(self.priority)
    }

    /// Encode the job as a JSON message body.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode a job from a JSON message body.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Per-call publishing overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnqueueOptions {
    /// Overrides the job's own priority when set.
    pub priority: Option<Priority>,
}

impl EnqueueOptions {
    /// Override the priority for this publish.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}
