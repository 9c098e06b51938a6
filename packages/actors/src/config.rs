use std::path::PathBuf;
use std::time::Duration;

use kyc_core::DEFAULT_FRESHNESS;

pub const DEFAULT_FONT_DIR: &str = "./fonts";
pub const DEFAULT_FONT_NAME: &str = "LiberationSans";

/// Worker settings.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// PDFs younger than this are not regenerated.
    pub freshness: Duration,
    /// Directory holding the `<name>-Regular.ttf` family used for rendering.
    pub font_dir: PathBuf,
    pub font_name: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            freshness: DEFAULT_FRESHNESS,
            font_dir: PathBuf::from(DEFAULT_FONT_DIR),
            font_name: DEFAULT_FONT_NAME.to_string(),
        }
    }
}

impl WorkerConfig {
    /// Build a config from environment variables.
    ///
    /// - `PDF_FRESHNESS_SECS` (default: 3600)
    /// - `PDF_FONT_DIR` (default: `./fonts`)
    /// - `PDF_FONT_NAME` (default: `LiberationSans`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            freshness: env("PDF_FRESHNESS_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.freshness),
            font_dir: env("PDF_FONT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.font_dir),
            font_name: env("PDF_FONT_NAME").unwrap_or(defaults.font_name),
        }
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
