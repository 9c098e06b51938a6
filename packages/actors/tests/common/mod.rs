#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actors::{JobProcessor, PdfRenderer, RenderError};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use kyc_core::{KycId, KycRecord, RecordStore, StoreError, StoreFuture};
use storage::{Storage, StorageConfig};
use summary::SummaryProvider;

/// In-memory record store.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<KycId, KycRecord>>,
    fail_loads: bool,
}

impl MemoryStore {
    pub fn with(records: impl IntoIterator<Item = KycRecord>) -> Self {
        let store = Self::default();
        for record in records {
            store.insert(record);
        }
        store
    }

    pub fn failing_loads() -> Self {
        Self {
            fail_loads: true,
            ..Default::default()
        }
    }

    pub fn insert(&self, record: KycRecord) {
        self.records.lock().unwrap().insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<KycRecord> {
        self.records.lock().unwrap().get(&KycId::new(id)).cloned()
    }

    fn update(&self, id: &KycId, f: impl FnOnce(&mut KycRecord)) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        f(record);
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn load<'a>(&'a self, id: &'a KycId) -> StoreFuture<'a, Option<KycRecord>> {
        Box::pin(async move {
            if self.fail_loads {
                return Err(StoreError::Backend("connection reset".into()));
            }
            Ok(self.records.lock().unwrap().get(id).cloned())
        })
    }

    fn mark_pdf_generated<'a>(
        &'a self,
        id: &'a KycId,
        pdf_path: &'a str,
        generated_at: DateTime<Utc>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.update(id, |r| {
                r.pdf_path = Some(pdf_path.to_string());
                r.pdf_generated_at = Some(generated_at);
                r.pdf_error = None;
                r.pdf_error_at = None;
            })
        })
    }

    fn mark_pdf_error<'a>(
        &'a self,
        id: &'a KycId,
        error: &'a str,
        failed_at: DateTime<Utc>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.update(id, |r| {
                r.pdf_error = Some(error.to_string());
                r.pdf_error_at = Some(failed_at);
            })
        })
    }
}

/// Renderer that writes a tiny placeholder document and counts calls.
#[derive(Default)]
pub struct StubRenderer {
    pub calls: Mutex<Vec<KycId>>,
    fail: bool,
}

impl StubRenderer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl PdfRenderer for StubRenderer {
    fn render(
        &self,
        record: &KycRecord,
        summary: &str,
        _generated_at: DateTime<Utc>,
    ) -> Result<Bytes, RenderError> {
        self.calls.lock().unwrap().push(record.id.clone());
        if self.fail {
            return Err(RenderError::Layout("page overflow".into()));
        }
        Ok(Bytes::from(format!("%PDF-1.4\n{}\n{}", record.id, summary)))
    }
}

pub fn applicant(id: &str) -> KycRecord {
    KycRecord::new(id)
        .with_name("Jane Doe")
        .with_email("jane@example.com")
        .with_nid("1234567890")
        .with_occupation("Engineer")
        .with_address("1 Main St")
}

pub fn job_payload(id: &str) -> Vec<u8> {
    kyc_core::PdfJob::new(id, "admin-1").to_bytes().unwrap()
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub renderer: Arc<StubRenderer>,
    pub documents: Storage,
}

impl Harness {
    pub async fn new(store: MemoryStore, renderer: StubRenderer) -> Self {
        Self {
            store: Arc::new(store),
            renderer: Arc::new(renderer),
            documents: Storage::new(StorageConfig::memory()).await.unwrap(),
        }
    }

    pub fn processor(&self) -> JobProcessor {
        JobProcessor::new(
            self.store.clone(),
            self.renderer.clone(),
            self.documents.clone(),
            SummaryProvider::disabled(),
        )
    }
}
