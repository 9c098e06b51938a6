//! Risk summaries for KYC applications.
//!
//! [`SummaryProvider`] asks a chat-completion API for a narrative summary and
//! falls back to the rule-based [`basic_summary`] whenever the API is not
//! configured or fails. Summarizing never returns an error.

mod basic;
mod client;
mod config;
mod error;
mod openrouter;
mod prompt;
mod provider;

pub use basic::{Completeness, RiskLevel, basic_summary};
pub use client::{CompletionFuture, CompletionRequest, DisabledClient, SummaryClient};
pub use config::{
    APP_TITLE, DEFAULT_APP_URL, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
    SummaryConfig,
};
pub use error::SummaryError;
pub use openrouter::OpenRouterClient;
pub use prompt::{SYSTEM_PROMPT, build_prompt};
pub use provider::{BATCH_PAUSE, DEFAULT_MAX_CONCURRENT, SummaryProvider};
