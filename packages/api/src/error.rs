use broker::BrokerError;
use kyc_core::{KycId, StoreError};
use storage::StorageError;
use thiserror::Error;

/// Errors surfaced to admin callers.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("KYC application not found: {0}")]
    RecordNotFound(KycId),

    #[error("PDF not generated yet for KYC application {0}")]
    PdfNotReady(KycId),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    /// HTTP status an adapter should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::RecordNotFound(_) | ServiceError::PdfNotReady(_) => 404,
            ServiceError::InvalidRequest(_) => 400,
            ServiceError::Broker(_) => 503,
            ServiceError::Store(_) | ServiceError::Storage(_) => 500,
        }
    }
}
