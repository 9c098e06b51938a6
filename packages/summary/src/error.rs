use thiserror::Error;

/// Errors from the completion API. Never escape [`crate::SummaryProvider`].
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("summary API is not configured")]
    Disabled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}
