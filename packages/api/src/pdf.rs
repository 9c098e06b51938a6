//! PDF request, status and download operations.

use broker::JobPublisher;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use kyc_core::{BatchOutcome, EnqueueOptions, KycId, KycRecord, PdfJob, Priority};
use serde::{Deserialize, Serialize};

use crate::{AdminService, ServiceError};

/// Body of a single PDF request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfRequest {
    #[serde(default)]
    pub priority: Option<Priority>,
}

/// Body of a batch PDF request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPdfRequest {
    pub kyc_ids: Vec<KycId>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

/// PDF state of one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfStatus {
    pub kyc_id: KycId,
    /// True when a rendered PDF is on record.
    pub available: bool,
    pub pdf_path: Option<String>,
    pub generated_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub error_at: Option<DateTime<Utc>>,
}

impl From<&KycRecord> for PdfStatus {
    fn from(record: &KycRecord) -> Self {
        Self {
            kyc_id: record.id.clone(),
            available: record.pdf_path.is_some() && record.pdf_generated_at.is_some(),
            pdf_path: record.pdf_path.clone(),
            generated_at: record.pdf_generated_at,
            error: record.pdf_error.clone(),
            error_at: record.pdf_error_at,
        }
    }
}

impl<P: JobPublisher> AdminService<P> {
    async fn load(&self, id: &KycId) -> Result<KycRecord, ServiceError> {
        self.store
            .load(id)
            .await?
            .ok_or_else(|| ServiceError::RecordNotFound(id.clone()))
    }

    /// Queue PDF generation for one existing application.
    pub async fn request_pdf(
        &self,
        id: &KycId,
        requested_by: &str,
        request: PdfRequest,
    ) -> Result<PdfJob, ServiceError> {
        let record = self.load(id).await?;

        let options = EnqueueOptions {
            priority: request.priority,
        };
        let job = self
            .producer
            .enqueue(PdfJob::new(record.id, requested_by), options)
            .await?;

        tracing::info!("PDF generation requested for KYC {} by {}", id, requested_by);
        Ok(job)
    }

    /// Queue PDF generation for many applications.
    ///
    /// Individual failures are reported in the outcome.
    pub async fn request_batch(
        &self,
        requested_by: &str,
        request: BatchPdfRequest,
    ) -> Result<BatchOutcome, ServiceError> {
        if request.kyc_ids.is_empty() {
            return Err(ServiceError::InvalidRequest(
                "kycIds must be a non-empty list".to_string(),
            ));
        }

        Ok(self
            .producer
            .enqueue_batch(&request.kyc_ids, requested_by, request.priority)
            .await)
    }

    pub async fn pdf_status(&self, id: &KycId) -> Result<PdfStatus, ServiceError> {
        let record = self.load(id).await?;
        Ok(PdfStatus::from(&record))
    }

    /// Fetch the stored PDF of an application.
    pub async fn download_pdf(&self, id: &KycId) -> Result<Bytes, ServiceError> {
        let record = self.load(id).await?;
        let Some(pdf_path) = record.pdf_path.filter(|_| record.pdf_generated_at.is_some()) else {
            return Err(ServiceError::PdfNotReady(id.clone()));
        };

        match self.documents.get_pdf(&pdf_path).await {
            Ok(bytes) => Ok(bytes),
            Err(storage::StorageError::NotFound(_)) => {
                tracing::warn!("PDF for KYC {} recorded at {} but missing", id, pdf_path);
                Err(ServiceError::PdfNotReady(id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
