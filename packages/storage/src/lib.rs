//! Storage for rendered KYC PDFs.
//!
//! Documents are written through `object_store`, so the same code serves an
//! S3-compatible bucket in production, a local directory in development and
//! an in-memory store in tests. Each application owns exactly one key,
//! `kyc/<id>.pdf`; re-rendering overwrites it.

mod config;

use std::sync::Arc;

use bytes::Bytes;
use kyc_core::KycId;
use object_store::path::Path;
use object_store::{ObjectStore, ObjectStoreExt};

pub use config::{Backend, DEFAULT_FS_ROOT, S3Config, StorageConfig};

const PDF_DIR: &str = "kyc";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid storage config: {0}")]
    InvalidConfig(String),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("object_store error: {0}")]
    ObjectStore(#[from] object_store::Error),
}

/// Storage key of the PDF for an application.
pub fn pdf_key(id: &KycId) -> String {
    format!("{PDF_DIR}/{id}.pdf")
}

/// Handle to the document store. Cheap to clone.
#[derive(Clone)]
pub struct Storage {
    backend: &'static str,
    store: Arc<dyn ObjectStore>,
    prefix: Option<String>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("backend", &self.backend)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl Storage {
    pub async fn new(cfg: StorageConfig) -> Result<Self, StorageError> {
        let (backend, store): (&'static str, Arc<dyn ObjectStore>) = match cfg.backend {
            Backend::S3(s3) => ("s3", Arc::new(build_s3(s3)?)),
            Backend::Filesystem { root } => {
                std::fs::create_dir_all(&root)?;
                let fs = object_store::local::LocalFileSystem::new_with_prefix(&root)?;
                ("filesystem", Arc::new(fs))
            }
            Backend::Memory => ("memory", Arc::new(object_store::memory::InMemory::new())),
        };

        tracing::info!("Document storage ready: {}", backend);

        Ok(Self {
            backend,
            store,
            prefix: cfg
                .prefix
                .map(|p| p.trim_matches('/').to_string())
                .filter(|p| !p.is_empty()),
        })
    }

    pub async fn from_env() -> Result<Self, StorageError> {
        Self::new(StorageConfig::from_env()?).await
    }

    /// Name of the active backend (`s3`, `filesystem`, `memory`).
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    fn path(&self, key: &str) -> Result<Path, StorageError> {
        let key = key.trim_start_matches('/');
        if key.is_empty() {
            return Err(StorageError::InvalidConfig(
                "object key must not be empty".to_string(),
            ));
        }
        Ok(match &self.prefix {
            Some(prefix) => Path::from(format!("{prefix}/{key}")),
            None => Path::from(key),
        })
    }

    /// Store the PDF for an application, replacing any earlier one.
    ///
    /// Returns the key to record on the application.
    pub async fn put_pdf(&self, id: &KycId, pdf: Bytes) -> Result<String, StorageError> {
        let key = pdf_key(id);
        let size = pdf.len();
        self.store
            .put(&self.path(&key)?, object_store::PutPayload::from(pdf))
            .await?;
        tracing::debug!("Stored {} ({} bytes)", key, size);
        Ok(key)
    }

    /// Fetch a stored document by key.
    pub async fn get_pdf(&self, key: &str) -> Result<Bytes, StorageError> {
        let result = match self.store.get(&self.path(key)?).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(result.bytes().await?)
    }

    /// Whether a document exists under `key`.
    pub async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        match self.store.head(&self.path(key)?).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.store.delete(&self.path(key)?).await?;
        Ok(())
    }
}

fn build_s3(cfg: S3Config) -> Result<object_store::aws::AmazonS3, StorageError> {
    let mut builder = object_store::aws::AmazonS3Builder::new()
        .with_bucket_name(cfg.bucket)
        .with_region(cfg.region)
        .with_virtual_hosted_style_request(cfg.virtual_hosted_style)
        .with_allow_http(cfg.allow_http);

    if let Some(endpoint) = cfg.endpoint {
        builder = builder.with_endpoint(endpoint);
    }
    if let Some(key) = cfg.access_key_id {
        builder = builder.with_access_key_id(key);
    }
    if let Some(secret) = cfg.secret_access_key {
        builder = builder.with_secret_access_key(secret);
    }
    if let Some(token) = cfg.session_token {
        builder = builder.with_token(token);
    }

    Ok(builder.build()?)
}
