//! KYC repository for loading applications and recording PDF state.

use chrono::{DateTime, Utc};
use kyc_core::{KycId, KycRecord, RecordStore, StoreError, StoreFuture};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::{DbError, get_db};

const TABLE: &str = "kyc";

/// Repository for KYC application persistence.
///
/// Stateless; every call goes through the global connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct KycRepository;

/// Internal record type for SurrealDB.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct KycRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Thing>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    nid: Option<String>,
    #[serde(default)]
    occupation: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pdf_path: Option<String>,
    #[serde(default)]
    pdf_generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pdf_error: Option<String>,
    #[serde(default)]
    pdf_error_at: Option<DateTime<Utc>>,
}

impl KycRow {
    fn from_record(record: &KycRecord) -> Self {
        Self {
            id: None,
            name: record.name.clone(),
            email: record.email.clone(),
            nid: record.nid.clone(),
            occupation: record.occupation.clone(),
            address: record.address.clone(),
            status: record.status.clone(),
            submitted_at: record.submitted_at,
            pdf_path: record.pdf_path.clone(),
            pdf_generated_at: record.pdf_generated_at,
            pdf_error: record.pdf_error.clone(),
            pdf_error_at: record.pdf_error_at,
        }
    }

    fn into_record(self, id: KycId) -> KycRecord {
        KycRecord {
            id,
            name: self.name,
            email: self.email,
            nid: self.nid,
            occupation: self.occupation,
            address: self.address,
            status: self.status,
            submitted_at: self.submitted_at,
            pdf_path: self.pdf_path,
            pdf_generated_at: self.pdf_generated_at,
            pdf_error: self.pdf_error,
            pdf_error_at: self.pdf_error_at,
        }
    }

    fn record_id(&self) -> KycId {
        KycId::new(self.id.as_ref().map(|t| t.id.to_raw()).unwrap_or_default())
    }
}

impl KycRepository {
    /// Create a new application in the database.
    pub async fn create(record: &KycRecord) -> Result<KycRecord, DbError> {
        let db = get_db()?;

        let row: Option<KycRow> = db
            .create((TABLE, record.id.to_string()))
            .content(KycRow::from_record(record))
            .await?;

        row.map(|r| r.into_record(record.id.clone()))
            .ok_or_else(|| DbError::Query("Failed to create KYC record".into()))
    }

    /// Get an application by ID, `None` when absent.
    pub async fn find(id: &KycId) -> Result<Option<KycRecord>, DbError> {
        let db = get_db()?;

        let row: Option<KycRow> = db.select((TABLE, id.to_string())).await?;

        Ok(row.map(|r| r.into_record(id.clone())))
    }

    /// Get an application by ID.
    pub async fn get(id: &KycId) -> Result<KycRecord, DbError> {
        Self::find(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("KYC record not found: {}", id)))
    }

    /// List applications, most recently submitted first.
    pub async fn list(limit: usize) -> Result<Vec<KycRecord>, DbError> {
        let db = get_db()?;

        let mut result = db
            .query("SELECT * FROM kyc ORDER BY submitted_at DESC LIMIT $limit")
            .bind(("limit", limit as i64))
            .await?;

        let rows: Vec<KycRow> = result.take(0)?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let id = r.record_id();
                r.into_record(id)
            })
            .collect())
    }

    /// Store the location of a freshly rendered PDF and clear any earlier error.
    pub async fn set_pdf_generated(
        id: &KycId,
        pdf_path: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<KycRecord, DbError> {
        Self::merge(
            id,
            serde_json::json!({
                "pdf_path": pdf_path,
                "pdf_generated_at": generated_at,
                "pdf_error": null,
                "pdf_error_at": null,
            }),
        )
        .await
    }

    /// Store the reason a render failed.
    pub async fn set_pdf_error(
        id: &KycId,
        error: &str,
        failed_at: DateTime<Utc>,
    ) -> Result<KycRecord, DbError> {
        Self::merge(
            id,
            serde_json::json!({
                "pdf_error": error,
                "pdf_error_at": failed_at,
            }),
        )
        .await
    }

    /// Delete an application.
    pub async fn delete(id: &KycId) -> Result<(), DbError> {
        let db = get_db()?;

        let _: Option<KycRow> = db.delete((TABLE, id.to_string())).await?;

        Ok(())
    }

    /// Merge a partial update into an existing record only.
    async fn merge(id: &KycId, fields: serde_json::Value) -> Result<KycRecord, DbError> {
        let db = get_db()?;

        let row: Option<KycRow> = db.update((TABLE, id.to_string())).merge(fields).await?;

        row.map(|r| r.into_record(id.clone()))
            .ok_or_else(|| DbError::NotFound(format!("KYC record not found: {}", id)))
    }
}

fn store_error(id: &KycId, err: DbError) -> StoreError {
    match err {
        DbError::NotFound(_) => StoreError::NotFound(id.clone()),
        other => StoreError::Backend(other.to_string()),
    }
}

impl RecordStore for KycRepository {
    fn load<'a>(&'a self, id: &'a KycId) -> StoreFuture<'a, Option<KycRecord>> {
        Box::pin(async move { Self::find(id).await.map_err(|e| store_error(id, e)) })
    }

    fn mark_pdf_generated<'a>(
        &'a self,
        id: &'a KycId,
        pdf_path: &'a str,
        generated_at: DateTime<Utc>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            Self::set_pdf_generated(id, pdf_path, generated_at)
                .await
                .map(|_| ())
                .map_err(|e| store_error(id, e))
        })
    }

    fn mark_pdf_error<'a>(
        &'a self,
        id: &'a KycId,
        error: &'a str,
        failed_at: DateTime<Utc>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            Self::set_pdf_error(id, error, failed_at)
                .await
                .map(|_| ())
                .map_err(|e| store_error(id, e))
        })
    }
}
