//! Backend selection for generated documents.

use std::path::PathBuf;

use crate::StorageError;

/// Default on-disk location for local development.
pub const DEFAULT_FS_ROOT: &str = "./data/documents";

/// Connection details for an S3-compatible bucket.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub allow_http: bool,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub virtual_hosted_style: bool,
}

/// Where rendered PDFs live.
#[derive(Debug, Clone)]
pub enum Backend {
    S3(S3Config),
    Filesystem { root: PathBuf },
    Memory,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: Backend,
    /// Optional key prefix applied in front of every document key.
    pub prefix: Option<String>,
}

impl StorageConfig {
    pub fn memory() -> Self {
        Self::with_backend(Backend::Memory)
    }

    pub fn filesystem(root: impl Into<PathBuf>) -> Self {
        Self::with_backend(Backend::Filesystem { root: root.into() })
    }

    pub fn s3(cfg: S3Config) -> Self {
        Self::with_backend(Backend::S3(cfg))
    }

    fn with_backend(backend: Backend) -> Self {
        Self {
            backend,
            prefix: None,
        }
    }

    /// Set the key prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Build a config from environment variables.
    ///
    /// - `STORAGE_BACKEND`: `s3`, `filesystem` (default) or `memory`
    /// - `STORAGE_FS_ROOT` (default: `./data/documents`)
    /// - `STORAGE_PREFIX` (optional)
    /// - `S3_BUCKET`, `AWS_REGION`, `S3_ENDPOINT`, `S3_ALLOW_HTTP`,
    ///   `S3_VIRTUAL_HOSTED_STYLE`, `AWS_ACCESS_KEY_ID`,
    ///   `AWS_SECRET_ACCESS_KEY`, `AWS_SESSION_TOKEN` for the s3 backend
    pub fn from_env() -> Result<Self, StorageError> {
        let backend = match env("STORAGE_BACKEND").as_deref() {
            Some("s3") => Backend::S3(s3_from_env()?),
            Some("memory" | "mem") => Backend::Memory,
            Some("filesystem" | "fs") | None => Backend::Filesystem {
                root: env("STORAGE_FS_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_FS_ROOT)),
            },
            Some(other) => {
                return Err(StorageError::InvalidConfig(format!(
                    "unsupported STORAGE_BACKEND={other} (expected s3|filesystem|memory)"
                )));
            }
        };

        Ok(Self {
            backend,
            prefix: env("STORAGE_PREFIX"),
        })
    }
}

/// Trimmed, non-empty environment variable.
fn env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_flag(name: &str) -> Result<Option<bool>, StorageError> {
    let Some(raw) = env(name) else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Ok(Some(true)),
        "0" | "false" | "no" | "n" => Ok(Some(false)),
        _ => Err(StorageError::InvalidConfig(format!(
            "invalid boolean for {name}={raw} (expected true/false)"
        ))),
    }
}

fn s3_from_env() -> Result<S3Config, StorageError> {
    let bucket = env("S3_BUCKET").ok_or_else(|| {
        StorageError::InvalidConfig("S3_BUCKET is required for s3 backend".into())
    })?;
    let endpoint = env("S3_ENDPOINT");

    // Plain-http endpoints (MinIO, localstack) need an explicit opt-in.
    let allow_http = match env_flag("S3_ALLOW_HTTP")? {
        Some(flag) => flag,
        None => endpoint
            .as_deref()
            .is_some_and(|e| e.to_ascii_lowercase().starts_with("http://")),
    };

    Ok(S3Config {
        bucket,
        region: env("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
        endpoint,
        allow_http,
        access_key_id: env("AWS_ACCESS_KEY_ID"),
        secret_access_key: env("AWS_SECRET_ACCESS_KEY"),
        session_token: env("AWS_SESSION_TOKEN"),
        virtual_hosted_style: env_flag("S3_VIRTUAL_HOSTED_STYLE")?.unwrap_or(false),
    })
}
