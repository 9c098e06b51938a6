//! Connection and channel lifecycle.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use kyc_core::{Priority, QueueSpec, QueueStatus};
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions, QueueDeclareOptions};
use lapin::publisher_confirm::Confirmation;
use lapin::types::{AMQPValue, FieldTable};
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use tokio::sync::Mutex;

use crate::{BrokerConfig, BrokerError};

/// AMQP delivery mode for messages that survive a broker restart.
const PERSISTENT: u8 = 2;

/// Anything jobs can be published through.
pub trait JobPublisher: Send + Sync + 'static {
    /// Publish an encoded job and wait for the broker to confirm it.
    fn publish(
        &self,
        payload: &[u8],
        priority: Priority,
        message_id: &str,
    ) -> impl Future<Output = Result<(), BrokerError>> + Send;

    /// Current depth and consumer count of the job queue.
    fn queue_status(&self) -> impl Future<Output = Result<QueueStatus, BrokerError>> + Send;
}

/// One live connection plus the channel opened on it.
struct Session {
    connection: Arc<Connection>,
    channel: Option<Channel>,
    /// Set by the connection error handler.
    broken: Arc<AtomicBool>,
}

impl Session {
    fn is_live(&self) -> bool {
        !self.broken.load(Ordering::SeqCst) && self.connection.status().connected()
    }
}

/// Owner of the process's broker session.
///
/// The connection and channel are opened lazily and replaced as a pair once
/// the broker drops them. Nothing reconnects in the background; the next
/// caller does.
pub struct BrokerConnection {
    config: BrokerConfig,
    session: Mutex<Option<Session>>,
}

impl BrokerConnection {
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            config,
            session: Mutex::new(None),
        }
    }

    pub fn queue(&self) -> &QueueSpec {
        &self.config.queue
    }

    /// Return the live connection, opening a new one if needed.
    pub async fn connect(&self) -> Result<Arc<Connection>, BrokerError> {
        let mut slot = self.session.lock().await;
        let session = self.live_session(&mut slot).await?;
        Ok(session.connection.clone())
    }

    /// Return the live channel, opening one and declaring the queue if needed.
    pub async fn channel(&self) -> Result<Channel, BrokerError> {
        let mut slot = self.session.lock().await;
        let session = self.live_session(&mut slot).await?;

        if let Some(channel) = session.channel.as_ref().filter(|c| c.status().connected()) {
            return Ok(channel.clone());
        }

        let channel = session
            .connection
            .create_channel()
            .await
            .map_err(BrokerError::ChannelSetup)?;

        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(BrokerError::ChannelSetup)?;

        let queue = &self.config.queue;
        channel
            .queue_declare(
                &queue.name,
                QueueDeclareOptions {
                    durable: queue.durable,
                    ..Default::default()
                },
                queue_arguments(queue),
            )
            .await
            .map_err(BrokerError::ChannelSetup)?;

        tracing::info!(
            "Channel ready, queue '{}' declared (max priority {})",
            queue.name,
            queue.max_priority
        );

        session.channel = Some(channel.clone());
        Ok(channel)
    }

    async fn live_session<'a>(
        &self,
        slot: &'a mut Option<Session>,
    ) -> Result<&'a mut Session, BrokerError> {
        let session = match slot.take() {
            Some(session) if session.is_live() => session,
            stale => {
                if stale.is_some() {
                    tracing::warn!("Broker connection lost, opening a new one");
                }
                self.open().await?
            }
        };
        Ok(slot.insert(session))
    }

    async fn open(&self) -> Result<Session, BrokerError> {
        let connection = Connection::connect(&self.config.url, ConnectionProperties::default())
            .await
            .map_err(BrokerError::BrokerUnavailable)?;

        let broken = Arc::new(AtomicBool::new(false));
        let flag = broken.clone();
        connection.on_error(move |err| {
            tracing::error!("Broker connection error: {}", err);
            flag.store(true, Ordering::SeqCst);
        });

        tracing::info!("Connected to RabbitMQ");

        Ok(Session {
            connection: Arc::new(connection),
            channel: None,
            broken,
        })
    }

    /// Close the channel and then the connection.
    ///
    /// Never fails; errors met on the way are logged and returned.
    pub async fn close(&self) -> Vec<BrokerError> {
        let mut errors = Vec::new();
        let Some(session) = self.session.lock().await.take() else {
            return errors;
        };

        if let Some(channel) = session.channel.filter(|c| c.status().connected()) {
            if let Err(e) = channel.close(200, "shutdown").await {
                errors.push(BrokerError::Close(e));
            }
        }
        if session.connection.status().connected() {
            if let Err(e) = session.connection.close(200, "shutdown").await {
                errors.push(BrokerError::Close(e));
            }
        }

        for err in &errors {
            tracing::warn!("Error while closing broker session: {}", err);
        }
        tracing::info!("Broker connection closed");
        errors
    }
}

impl JobPublisher for BrokerConnection {
    async fn publish(
        &self,
        payload: &[u8],
        priority: Priority,
        message_id: &str,
    ) -> Result<(), BrokerError> {
        let channel = self.channel().await?;

        let properties = BasicProperties::default()
            .with_delivery_mode(PERSISTENT)
            .with_priority(priority.get())
            .with_content_type("application/json".into())
            .with_message_id(message_id.into());

        let confirm = channel
            .basic_publish(
                "",
                &self.config.queue.name,
                BasicPublishOptions::default(),
                payload,
                properties,
            )
            .await
            .map_err(|e| BrokerError::Publish(e.to_string()))?
            .await
            .map_err(|e| BrokerError::Publish(e.to_string()))?;

        match confirm {
            Confirmation::Nack(_) => Err(BrokerError::Publish(
                "broker refused the message".to_string(),
            )),
            _ => Ok(()),
        }
    }

    async fn queue_status(&self) -> Result<QueueStatus, BrokerError> {
        let channel = self.channel().await?;

        let queue = channel
            .queue_declare(
                &self.config.queue.name,
                QueueDeclareOptions {
                    passive: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(BrokerError::ChannelSetup)?;

        Ok(QueueStatus {
            queue_name: self.config.queue.name.clone(),
            message_count: queue.message_count(),
            consumer_count: queue.consumer_count(),
        })
    }
}

fn queue_arguments(queue: &QueueSpec) -> FieldTable {
    let mut args = FieldTable::default();
    args.insert(
        "x-max-priority".into(),
        AMQPValue::LongInt(i32::from(queue.max_priority)),
    );
    args
}
