use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.1-8b-instruct:free";
pub const DEFAULT_APP_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Sent as `X-Title` so the provider can attribute traffic.
pub const APP_TITLE: &str = "EKYC System";

/// Completion API settings.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// API credential; `None` disables the API entirely.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Sent as `HTTP-Referer`.
    pub app_url: String,
    pub app_title: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            app_url: DEFAULT_APP_URL.to_string(),
            app_title: APP_TITLE.to_string(),
        }
    }
}

impl SummaryConfig {
    /// Build a config from environment variables.
    ///
    /// - `OPENROUTER_API_KEY` (unset disables the API)
    /// - `OPENROUTER_MODEL`
    /// - `OPENROUTER_BASE_URL`
    /// - `OPENROUTER_TIMEOUT` (seconds, default 60)
    /// - `APP_URL`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: env("OPENROUTER_API_KEY"),
            model: env("OPENROUTER_MODEL").unwrap_or(defaults.model),
            base_url: env("OPENROUTER_BASE_URL").unwrap_or(defaults.base_url),
            timeout: env("OPENROUTER_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            app_url: env("APP_URL").unwrap_or(defaults.app_url),
            app_title: defaults.app_title,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// True when a credential is present.
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
