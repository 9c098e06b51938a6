//! Environment configuration for the broker and the consumer loop.

use kyc_core::QueueSpec;

pub const DEFAULT_AMQP_URL: &str = "amqp://localhost:5672";

/// Broker connection settings.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub url: String,
    pub queue: QueueSpec,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_AMQP_URL.to_string(),
            queue: QueueSpec::default(),
        }
    }
}

impl BrokerConfig {
    /// Build a config from environment variables.
    ///
    /// - `RABBITMQ_URL` (default: `amqp://localhost:5672`)
    /// - `PDF_QUEUE_NAME` (default: `pdf_generation_queue`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env("RABBITMQ_URL").unwrap_or(defaults.url),
            queue: env("PDF_QUEUE_NAME")
                .map(QueueSpec::named)
                .unwrap_or(defaults.queue),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Consumer loop settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumeOptions {
    /// Unacknowledged deliveries the broker may push at once.
    pub prefetch: u16,
    /// When false, failed jobs are dropped instead of requeued.
    pub requeue: bool,
    /// Total deliveries allowed per job; `None` requeues forever.
    pub max_attempts: Option<u32>,
}

impl Default for ConsumeOptions {
    fn default() -> Self {
        Self {
            prefetch: 1,
            requeue: true,
            max_attempts: Some(5),
        }
    }
}

impl ConsumeOptions {
    /// Build options from environment variables.
    ///
    /// - `PDF_WORKER_PREFETCH` (default: 1)
    /// - `PDF_WORKER_REQUEUE` (default: true)
    /// - `PDF_WORKER_MAX_ATTEMPTS` (default: 5, `0` for unlimited)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let prefetch = env("PDF_WORKER_PREFETCH")
            .and_then(|v| v.parse::<u16>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(defaults.prefetch);

        let requeue = env("PDF_WORKER_REQUEUE")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "n"))
            .unwrap_or(defaults.requeue);

        let max_attempts = match env("PDF_WORKER_MAX_ATTEMPTS").map(|v| v.parse::<u32>()) {
            Some(Ok(0)) => None,
            Some(Ok(n)) => Some(n),
            _ => defaults.max_attempts,
        };

        Self {
            prefetch,
            requeue,
            max_attempts,
        }
    }

    pub fn with_requeue(mut self, requeue: bool) -> Self {
        self.requeue = requeue;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
