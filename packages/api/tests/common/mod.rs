#![allow(dead_code)]

use std::sync::{Arc, LazyLock, Mutex as StdMutex};

use api::AdminService;
use broker::{BrokerError, JobPublisher, Producer};
use db::DbConfig;
use db::repositories::KycRepository;
use kyc_core::{PdfJob, Priority, QueueStatus};
use storage::{Storage, StorageConfig};
use tokio::sync::{Mutex, MutexGuard};

static TEST_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Runtime that owns the shared database connection, so it outlives each
/// per-test runtime created by `#[tokio::test]`.
static DB_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build database runtime")
});

pub async fn setup_db() -> Result<MutexGuard<'static, ()>, Box<dyn std::error::Error>> {
    let guard = TEST_LOCK.lock().await;
    DB_RUNTIME.spawn(db::init(DbConfig::memory())).await??;
    db::get_db()?.query("DELETE kyc;").await?;
    Ok(guard)
}

/// Publisher that keeps jobs in memory instead of sending them to a broker.
#[derive(Default)]
pub struct InMemoryPublisher {
    pub jobs: StdMutex<Vec<(PdfJob, Priority)>>,
    pub down: bool,
}

impl InMemoryPublisher {
    pub fn down() -> Self {
        Self {
            down: true,
            ..Default::default()
        }
    }

    pub fn jobs(&self) -> Vec<(PdfJob, Priority)> {
        self.jobs.lock().unwrap().clone()
    }
}

impl JobPublisher for InMemoryPublisher {
    async fn publish(
        &self,
        payload: &[u8],
        priority: Priority,
        _message_id: &str,
    ) -> Result<(), BrokerError> {
        if self.down {
            return Err(BrokerError::Publish("connection refused".into()));
        }
        let job = PdfJob::from_bytes(payload)?;
        self.jobs.lock().unwrap().push((job, priority));
        Ok(())
    }

    async fn queue_status(&self) -> Result<QueueStatus, BrokerError> {
        Ok(QueueStatus {
            queue_name: kyc_core::PDF_QUEUE.to_string(),
            message_count: self.jobs.lock().unwrap().len() as u32,
            consumer_count: 0,
        })
    }
}

pub async fn service(
    publisher: InMemoryPublisher,
) -> (AdminService<InMemoryPublisher>, Arc<InMemoryPublisher>, Storage) {
    let publisher = Arc::new(publisher);
    let documents = Storage::new(StorageConfig::memory()).await.unwrap();
    let service = AdminService::new(
        Producer::new(publisher.clone()),
        Arc::new(KycRepository),
        documents.clone(),
    );
    (service, publisher, documents)
}
