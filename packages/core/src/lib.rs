//! Core domain types for the KYC PDF pipeline.
//!
//! This crate contains shared types used across all packages:
//! - PdfJob and Priority for the wire message
//! - KycRecord and the freshness check
//! - Queue declaration, status and batch reporting types
//! - The RecordStore seam the worker and admin layer persist through

mod delivery;
mod job;
mod queue;
mod record;
mod store;

pub use delivery::Disposition;
pub use job::{EnqueueOptions, JobId, PdfJob, Priority};
pub use queue::{BatchError, BatchOutcome, PDF_QUEUE, QueueSpec, QueueStatus};
pub use record::{DEFAULT_FRESHNESS, KycId, KycRecord, ProfileField};
pub use store::{RecordStore, StoreError, StoreFuture};
