use thiserror::Error;

/// Broker errors.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker unavailable: {0}")]
    BrokerUnavailable(#[source] lapin::Error),

    #[error("channel setup failed: {0}")]
    ChannelSetup(#[source] lapin::Error),

    #[error("publish failed: {0}")]
    Publish(String),

    #[error("failed to encode job: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("consumer error: {0}")]
    Consume(#[source] lapin::Error),

    #[error("failed to close broker resource: {0}")]
    Close(#[source] lapin::Error),

    #[error("consumer stream closed by broker")]
    ConsumerClosed,

    #[error("delivery handler unavailable: {0}")]
    HandlerUnavailable(String),
}
