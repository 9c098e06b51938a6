//! Persistence seam for KYC records.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};

use crate::{KycId, KycRecord};

/// Future type returned by record store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Errors from a record store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(KycId),

    #[error("store error: {0}")]
    Backend(String),
}

/// Storage for KYC records.
///
/// Writes are partial: each `mark_*` call touches only the PDF fields it
/// names and leaves the rest of the record as stored.
pub trait RecordStore: Send + Sync + 'static {
    /// Load a record, `None` when it does not exist.
    fn load<'a>(&'a self, id: &'a KycId) -> StoreFuture<'a, Option<KycRecord>>;

    /// Record a successful render and clear any previous error.
    fn mark_pdf_generated<'a>(
        &'a self,
        id: &'a KycId,
        pdf_path: &'a str,
        generated_at: DateTime<Utc>,
    ) -> StoreFuture<'a, ()>;

    /// Record a failed render.
    fn mark_pdf_error<'a>(
        &'a self,
        id: &'a KycId,
        error: &'a str,
        failed_at: DateTime<Utc>,
    ) -> StoreFuture<'a, ()>;
}
