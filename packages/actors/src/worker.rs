//! Worker startup: the actor plus the broker receive loop feeding it.

use std::sync::Arc;
use std::time::Duration;

use broker::{BrokerConnection, BrokerError, ConsumeOptions, DeliveryHandler};
use kyc_core::Disposition;
use ractor::rpc::CallResult;
use ractor::{Actor, ActorRef};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::messages::{WorkerMessage, WorkerStats};
use crate::{JobProcessor, PdfWorkerActor, ShutdownError};

const STATS_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle for sending deliveries to a worker actor.
#[derive(Debug, Clone)]
pub struct WorkerMailbox {
    actor: ActorRef<WorkerMessage>,
}

impl WorkerMailbox {
    pub fn new(actor: ActorRef<WorkerMessage>) -> Self {
        Self { actor }
    }

    /// Current counters, or `None` if the worker is not answering.
    pub async fn stats(&self) -> Option<WorkerStats> {
        let result = ractor::rpc::call(
            &self.actor,
            |reply| WorkerMessage::GetStats { reply },
            Some(STATS_TIMEOUT),
        )
        .await;

        match result {
            Ok(CallResult::Success(stats)) => Some(stats),
            _ => None,
        }
    }
}

impl DeliveryHandler for WorkerMailbox {
    /// Fails only when the actor is gone, so the job is never charged for it.
    async fn handle(&self, payload: &[u8], attempt: u32) -> Result<Disposition, BrokerError> {
        let payload = payload.to_vec();
        // No timeout: a job in progress is never cut short.
        let result = ractor::rpc::call(
            &self.actor,
            |reply| WorkerMessage::Deliver {
                payload,
                attempt,
                reply,
            },
            None,
        )
        .await;

        match result {
            Ok(CallResult::Success(disposition)) => Ok(disposition),
            Ok(_) => Err(BrokerError::HandlerUnavailable(
                "PDF worker dropped the delivery".to_string(),
            )),
            Err(e) => Err(BrokerError::HandlerUnavailable(format!(
                "PDF worker is not running: {}",
                e
            ))),
        }
    }
}

/// A running worker: one actor and the receive loop feeding it.
pub struct PdfWorker {
    mailbox: WorkerMailbox,
    actor_handle: JoinHandle<()>,
    consumer: JoinHandle<Result<(), BrokerError>>,
    shutdown: watch::Sender<bool>,
    finished: watch::Receiver<bool>,
}

/// Spawn the worker actor and start consuming the job queue.
pub async fn start_worker(
    processor: JobProcessor,
    broker: Arc<BrokerConnection>,
    options: ConsumeOptions,
) -> Result<PdfWorker, ractor::SpawnErr> {
    let (actor, actor_handle) = Actor::spawn(
        Some("pdf-worker".to_string()),
        PdfWorkerActor,
        Arc::new(processor),
    )
    .await?;

    let mailbox = WorkerMailbox::new(actor);
    let (shutdown, shutdown_rx) = watch::channel(false);
    let (finished_tx, finished) = watch::channel(false);

    let handler = mailbox.clone();
    let consumer = tokio::spawn(async move {
        let result = broker::consume(&broker, &handler, &options, shutdown_rx).await;
        if let Err(e) = &result {
            tracing::error!("PDF consumer stopped: {}", e);
        }
        let _ = finished_tx.send(true);
        result
    });

    Ok(PdfWorker {
        mailbox,
        actor_handle,
        consumer,
        shutdown,
        finished,
    })
}

impl PdfWorker {
    pub fn mailbox(&self) -> WorkerMailbox {
        self.mailbox.clone()
    }

    /// Resolves once the receive loop has ended on its own.
    pub async fn finished(&self) {
        let mut finished = self.finished.clone();
        while !*finished.borrow_and_update() {
            if finished.changed().await.is_err() {
                return;
            }
        }
    }

    /// Stop consuming after the current delivery, then stop the actor.
    ///
    /// Returns every error met on the way.
    pub async fn stop(self) -> Vec<ShutdownError> {
        let mut errors = Vec::new();

        let _ = self.shutdown.send(true);
        match self.consumer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => errors.push(ShutdownError::Consumer(e)),
            Err(e) => errors.push(ShutdownError::Task(e.to_string())),
        }

        if let Err(e) = self.mailbox.actor.send_message(WorkerMessage::Shutdown) {
            errors.push(ShutdownError::Task(e.to_string()));
        }
        if let Err(e) = self.actor_handle.await {
            errors.push(ShutdownError::Task(e.to_string()));
        }

        for err in &errors {
            tracing::warn!("Error while stopping PDF worker: {}", err);
        }
        tracing::info!("PDF worker stopped");
        errors
    }
}
