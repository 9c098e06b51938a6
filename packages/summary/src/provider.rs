//! Summary provider with rule-based fallback.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::join_all;
use kyc_core::KycRecord;

use crate::{
    CompletionRequest, DisabledClient, OpenRouterClient, SYSTEM_PROMPT, SummaryClient,
    SummaryConfig, basic_summary, build_prompt,
};

/// Default number of summaries requested at once in a batch.
pub const DEFAULT_MAX_CONCURRENT: usize = 3;
/// Pause between batch chunks, to stay under provider rate limits.
pub const BATCH_PAUSE: Duration = Duration::from_secs(1);

/// Produces a risk summary for every record, whatever the API does.
#[derive(Clone)]
pub struct SummaryProvider {
    client: Arc<dyn SummaryClient>,
    batch_pause: Duration,
}

impl std::fmt::Debug for SummaryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryProvider")
            .field("enabled", &self.is_enabled())
            .field("batch_pause", &self.batch_pause)
            .finish()
    }
}

impl SummaryProvider {
    pub fn new(client: Arc<dyn SummaryClient>) -> Self {
        Self {
            client,
            batch_pause: BATCH_PAUSE,
        }
    }

    /// Provider that only ever produces the basic summary.
    pub fn disabled() -> Self {
        Self::new(Arc::new(DisabledClient))
    }

    /// Select the client from configuration.
    ///
    /// A missing credential, or a client that cannot be built, selects the
    /// disabled client.
    pub fn from_config(config: SummaryConfig) -> Self {
        if !config.is_enabled() {
            tracing::warn!("OPENROUTER_API_KEY not set, using basic summaries only");
            return Self::disabled();
        }
        match OpenRouterClient::new(config) {
            Ok(client) => Self::new(Arc::new(client)),
            Err(e) => {
                tracing::error!("Failed to build summary client, using basic summaries: {}", e);
                Self::disabled()
            }
        }
    }

    pub fn with_batch_pause(mut self, pause: Duration) -> Self {
        self.batch_pause = pause;
        self
    }

    /// True when summaries come from the API. No I/O.
    pub fn is_enabled(&self) -> bool {
        self.client.is_enabled()
    }

    /// Summarize one record. Any API failure yields the basic summary.
    pub async fn summarize(&self, record: &KycRecord) -> String {
        if !self.is_enabled() {
            tracing::debug!("Summary API disabled, basic summary for KYC {}", record.id);
            return self.basic_summary(record);
        }

        let request = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(record),
        };

        match self.client.complete(&request).await {
            Ok(text) => {
                tracing::info!("AI summary generated for KYC {}", record.id);
                text
            }
            Err(e) => {
                tracing::warn!(
                    "Summary API failed for KYC {}, falling back to basic summary: {}",
                    record.id,
                    e
                );
                self.basic_summary(record)
            }
        }
    }

    /// The rule-based summary, evaluated against the current time.
    pub fn basic_summary(&self, record: &KycRecord) -> String {
        basic_summary(record, Utc::now())
    }

    /// Summarize many records in chunks of `max_concurrent`.
    ///
    /// Records within a chunk are summarized concurrently; chunks run one
    /// after another with a fixed pause between them. Output order matches
    /// input order.
    pub async fn summarize_batch(&self, records: &[KycRecord], max_concurrent: usize) -> Vec<String> {
        let mut summaries = Vec::with_capacity(records.len());

        for (index, chunk) in records.chunks(max_concurrent.max(1)).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.batch_pause).await;
            }
            summaries.extend(join_all(chunk.iter().map(|record| self.summarize(record))).await);
        }

        summaries
    }
}
