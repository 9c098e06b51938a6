//! Receive loop for the PDF queue.
//!
//! Each delivery is handed to a [`DeliveryHandler`] which answers with a
//! [`Disposition`]. The loop turns that answer into a [`Settlement`] and
//! settles the delivery before taking the next one.

use std::future::Future;

use futures_util::StreamExt;
use kyc_core::Disposition;
use lapin::message::Delivery;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicPublishOptions, BasicQosOptions,
};
use lapin::publisher_confirm::Confirmation;
use lapin::types::{AMQPValue, FieldTable};
use lapin::{BasicProperties, Channel};
use tokio::sync::watch;

use crate::{BrokerConnection, BrokerError, ConsumeOptions};

/// Header carrying the 1-based delivery attempt of a republished job.
pub const ATTEMPT_HEADER: &str = "x-attempt";

/// Processes one delivery body.
///
/// An `Err` means the handler itself is gone, not that the job failed. The
/// receive loop puts the delivery back untouched and stops.
pub trait DeliveryHandler: Send + Sync {
    fn handle(
        &self,
        payload: &[u8],
        attempt: u32,
    ) -> impl Future<Output = Result<Disposition, BrokerError>> + Send;
}

/// Broker-level action for a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Ack,
    Nack { requeue: bool },
    /// Publish a copy with the attempt header bumped, then ack the original.
    Retry { next_attempt: u32 },
}

/// Decide how to settle a delivery on its `attempt`-th try.
pub fn settlement_for(
    disposition: &Disposition,
    attempt: u32,
    options: &ConsumeOptions,
) -> Settlement {
    match disposition {
        Disposition::Ack => Settlement::Ack,
        Disposition::Drop { .. } => Settlement::Nack { requeue: false },
        Disposition::Requeue { .. } if !options.requeue => Settlement::Nack { requeue: false },
        Disposition::Requeue { .. } => match options.max_attempts {
            None => Settlement::Nack { requeue: true },
            Some(max) if attempt >= max => Settlement::Nack { requeue: false },
            Some(_) => Settlement::Retry {
                next_attempt: attempt + 1,
            },
        },
    }
}

/// Decide how to settle a delivery given the raw handler result.
///
/// A missing handler never spends an attempt: the delivery is requeued as is.
pub fn settlement_for_result(
    result: &Result<Disposition, BrokerError>,
    attempt: u32,
    options: &ConsumeOptions,
) -> Settlement {
    match result {
        Ok(disposition) => settlement_for(disposition, attempt, options),
        Err(_) => Settlement::Nack { requeue: true },
    }
}

/// Consume the job queue until `shutdown` flips to true.
///
/// Deliveries are handled strictly one at a time; shutdown is only observed
/// between messages. Job failures never end the loop. Returns an error when
/// the broker side of the consumer goes away or the handler is unavailable.
pub async fn consume<H: DeliveryHandler>(
    broker: &BrokerConnection,
    handler: &H,
    options: &ConsumeOptions,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), BrokerError> {
    if *shutdown.borrow() {
        tracing::info!("Shutdown requested before consuming, nothing to do");
        return Ok(());
    }

    let channel = broker.channel().await?;
    let queue = broker.queue().name.clone();

    channel
        .basic_qos(options.prefetch, BasicQosOptions::default())
        .await
        .map_err(BrokerError::ChannelSetup)?;

    let tag = format!("pdf-worker-{}", std::process::id());
    let mut deliveries = channel
        .basic_consume(
            &queue,
            &tag,
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await
        .map_err(BrokerError::ChannelSetup)?;

    tracing::info!(
        "Consuming '{}' as {} (prefetch {})",
        queue,
        tag,
        options.prefetch
    );

    loop {
        if *shutdown.borrow() {
            tracing::info!("Consumer {} stopping", tag);
            return Ok(());
        }

        let next = tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() {
                    tracing::info!("Shutdown sender dropped, consumer {} stopping", tag);
                    return Ok(());
                }
                continue;
            }
            next = deliveries.next() => next,
        };

        let delivery = match next {
            Some(Ok(delivery)) => delivery,
            Some(Err(e)) => return Err(BrokerError::Consume(e)),
            None => return Err(BrokerError::ConsumerClosed),
        };

        let attempt = attempt_of(&delivery.properties);
        let result = handler.handle(&delivery.data, attempt).await;
        let settlement = settlement_for_result(&result, attempt, options);

        match &result {
            Ok(disposition) if disposition.is_ack() => tracing::debug!(
                "Delivery {} acked (attempt {})",
                delivery.delivery_tag,
                attempt
            ),
            Ok(disposition) => tracing::warn!(
                "Delivery {} {} (attempt {}, settled as {:?})",
                delivery.delivery_tag,
                disposition,
                attempt,
                settlement
            ),
            Err(e) => tracing::error!(
                "Delivery {} returned to the queue, consumer {} stopping: {}",
                delivery.delivery_tag,
                tag,
                e
            ),
        }

        settle(&channel, &queue, &delivery, settlement).await?;
        result?;
    }
}

async fn settle(
    channel: &Channel,
    queue: &str,
    delivery: &Delivery,
    settlement: Settlement,
) -> Result<(), BrokerError> {
    let result = match settlement {
        Settlement::Ack => delivery.ack(BasicAckOptions::default()).await,
        Settlement::Nack { requeue } => {
            delivery
                .nack(BasicNackOptions {
                    requeue,
                    ..Default::default()
                })
                .await
        }
        Settlement::Retry { next_attempt } => {
            match republish(channel, queue, delivery, next_attempt).await {
                Ok(()) => delivery.ack(BasicAckOptions::default()).await,
                Err(e) => {
                    tracing::warn!(
                        "Could not republish delivery {}, requeueing in place: {}",
                        delivery.delivery_tag,
                        e
                    );
                    delivery
                        .nack(BasicNackOptions {
                            requeue: true,
                            ..Default::default()
                        })
                        .await
                }
            }
        }
    };
    result.map_err(BrokerError::Consume)
}

async fn republish(
    channel: &Channel,
    queue: &str,
    delivery: &Delivery,
    attempt: u32,
) -> Result<(), BrokerError> {
    let properties = with_attempt(delivery.properties.clone(), attempt);

    let confirm = channel
        .basic_publish(
            "",
            queue,
            BasicPublishOptions::default(),
            &delivery.data,
            properties,
        )
        .await
        .map_err(|e| BrokerError::Publish(e.to_string()))?
        .await
        .map_err(|e| BrokerError::Publish(e.to_string()))?;

    match confirm {
        Confirmation::Nack(_) => Err(BrokerError::Publish("broker refused the retry".into())),
        _ => Ok(()),
    }
}

/// Attempt number carried by a delivery; first deliveries have no header.
fn attempt_of(properties: &BasicProperties) -> u32 {
    properties
        .headers()
        .as_ref()
        .and_then(|headers| {
            headers
                .inner()
                .iter()
                .find(|(key, _)| key.as_str() == ATTEMPT_HEADER)
                .and_then(|(_, value)| header_u32(value))
        })
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

fn header_u32(value: &AMQPValue) -> Option<u32> {
    match *value {
        AMQPValue::ShortShortUInt(n) => Some(n.into()),
        AMQPValue::ShortUInt(n) => Some(n.into()),
        AMQPValue::LongUInt(n) => Some(n),
        AMQPValue::ShortShortInt(n) => u32::try_from(n).ok(),
        AMQPValue::ShortInt(n) => u32::try_from(n).ok(),
        AMQPValue::LongInt(n) => u32::try_from(n).ok(),
        AMQPValue::LongLongInt(n) => u32::try_from(n).ok(),
        _ => None,
    }
}

fn with_attempt(properties: BasicProperties, attempt: u32) -> BasicProperties {
    let mut headers = properties.headers().clone().unwrap_or_default();
    headers.insert(ATTEMPT_HEADER.into(), AMQPValue::LongLongInt(attempt.into()));
    properties.with_headers(headers)
}
