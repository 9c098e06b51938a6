//! The completion capability the provider is built on.

use std::future::Future;
use std::pin::Pin;

use crate::SummaryError;

/// Future type returned by [`SummaryClient::complete`].
pub type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, SummaryError>> + Send + 'a>>;

/// A two-message chat completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
}

/// Something that turns a prompt into text.
pub trait SummaryClient: Send + Sync {
    fn complete<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a>;

    /// False for clients that would never reach an API.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Client selected when no credential is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledClient;

impl SummaryClient for DisabledClient {
    fn complete<'a>(&'a self, _request: &'a CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(async { Err(SummaryError::Disabled) })
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
